use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::models::AppData;

const DATA_KEY: &str = "tailor_data";
const BACKUP_KEY: &str = "tailor_data_backup";
const LAST_SAVED_KEY: &str = "tailor_last_saved";

/// Key-value blob store backed by SQLite. The whole aggregate is written under
/// a single fixed key; a backup copy goes under a derived key on every save.
pub struct Storage {
    conn: Connection,
    path: PathBuf,
}

impl Storage {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        Ok(Self { conn, path })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        };
        storage.init()?;
        Ok(storage)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// In-memory databases have no directory to put file backups in.
    pub fn has_backing_file(&self) -> bool {
        self.path.as_os_str() != ":memory:"
    }

    /// Directory for the JSON backups written on version save.
    pub fn backup_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join("backups"),
            None => PathBuf::from("backups"),
        }
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "tailor") {
            Ok(proj_dirs.data_dir().join("tailor.db"))
        } else {
            Ok(PathBuf::from("tailor.db"))
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!("Storage not initialized. Run 'tailor init' first."));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load the aggregate. `None` means nothing has been stored yet.
    pub fn load(&self) -> Result<Option<AppData>> {
        match self.get(DATA_KEY)? {
            Some(blob) => {
                let data =
                    serde_json::from_str(&blob).context("Stored data blob is not valid JSON")?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Write the aggregate under the main key and the backup key.
    pub fn save(&self, data: &AppData) -> Result<()> {
        let blob = serde_json::to_string(data)?;
        self.put(DATA_KEY, &blob)?;
        self.put(BACKUP_KEY, &blob)?;
        Ok(())
    }

    pub fn mark_last_saved(&self) -> Result<()> {
        self.put(LAST_SAVED_KEY, &Utc::now().to_rfc3339())
    }

    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>> {
        match self.get(LAST_SAVED_KEY)? {
            Some(stamp) => Ok(DateTime::parse_from_rfc3339(&stamp)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))),
            None => Ok(None),
        }
    }

    // --- JSON file export / import ---

    pub fn export_filename() -> String {
        format!("tailor_export_{}.json", Utc::now().format("%Y-%m-%d"))
    }

    /// Write the aggregate as pretty-printed JSON into `dir`. Returns the path.
    pub fn export_json(data: &AppData, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(Self::export_filename());
        let blob = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, blob)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Parse an exported JSON file into a full aggregate. The caller decides
    /// whether to adopt it; a parse failure leaves existing state untouched.
    pub fn import_json(path: &Path) -> Result<AppData> {
        let blob = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data = serde_json::from_str(&blob)
            .with_context(|| format!("{} is not a valid export file", path.display()))?;
        Ok(data)
    }
}
