use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Utc};

use crate::models::{AppData, ResumeVersion};
use crate::storage::Storage;
use crate::store::{ResumeVersionPatch, Store};

/// Minutes of inactivity after which the preview nags about saving.
pub const DEFAULT_STALE_SAVE_MINUTES: i64 = 2;

/// What a resume version snapshots: which summary, which bullets, which
/// companies. Id lists are sorted so two states compare by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub summary_id: Option<String>,
    pub selected_bullets: Vec<String>,
    pub visible_companies: Vec<String>,
}

impl SelectionState {
    pub fn capture(data: &AppData) -> Self {
        let summary_id = data
            .summaries
            .iter()
            .find(|s| s.is_selected)
            .map(|s| s.id.clone());
        let mut selected_bullets: Vec<String> = data
            .bullets
            .iter()
            .filter(|b| b.is_selected)
            .map(|b| b.id.clone())
            .collect();
        selected_bullets.sort();
        let mut visible_companies: Vec<String> = data
            .companies
            .iter()
            .filter(|c| c.is_visible)
            .map(|c| c.id.clone())
            .collect();
        visible_companies.sort();
        Self {
            summary_id,
            selected_bullets,
            visible_companies,
        }
    }

    pub fn of_version(version: &ResumeVersion) -> Self {
        let mut selected_bullets = version.selected_bullets.clone();
        selected_bullets.sort();
        let mut visible_companies = version.selected_companies.clone();
        visible_companies.sort();
        Self {
            summary_id: version.summary_id.clone(),
            selected_bullets,
            visible_companies,
        }
    }
}

/// True when the live selection differs from the version `currentEditing`
/// points at. No pointer, or a dangling one, also counts as unsaved: there is
/// nothing to diff against, and a load would silently discard work.
pub fn has_unsaved_changes(data: &AppData) -> bool {
    let Some(version_id) = data.current_editing.resume_version_id.as_deref() else {
        return true;
    };
    let Some(version) = data.resume_versions.iter().find(|v| v.id == version_id) else {
        return true;
    };
    SelectionState::capture(data) != SelectionState::of_version(version)
}

/// Snapshot the current selection as a new named version. Also dumps a JSON
/// backup of the whole aggregate and stamps the last-saved time.
pub fn save_as_new(
    store: &mut Store,
    name: &str,
    description: Option<&str>,
    tags: Vec<String>,
) -> Result<String> {
    let state = SelectionState::capture(store.data());
    let id = store.save_resume_version(
        name,
        description,
        tags,
        state.summary_id,
        state.selected_bullets,
        state.visible_companies,
    );
    backup_after_save(store);
    Ok(id)
}

/// Overwrite the version `currentEditing` points at with the current
/// selection. Fails when the pointer is missing or dangling.
pub fn overwrite_current(store: &mut Store) -> Result<String> {
    let id = store
        .data()
        .current_editing
        .resume_version_id
        .clone()
        .ok_or_else(|| anyhow!("No resume version is being edited; save one by name first"))?;
    if !store.data().resume_versions.iter().any(|v| v.id == id) {
        bail!("Resume version '{}' no longer exists; save a new one instead", id);
    }
    let state = SelectionState::capture(store.data());
    store.update_resume_version(
        &id,
        ResumeVersionPatch {
            summary_id: Some(state.summary_id),
            selected_bullets: Some(state.selected_bullets),
            selected_companies: Some(state.visible_companies),
            ..Default::default()
        },
    )?;
    backup_after_save(store);
    Ok(id)
}

/// Load a saved version over the live selection. Loading is a destructive
/// overwrite, so unsaved changes block it until the caller confirms.
pub fn load_version(store: &mut Store, id: &str, force: bool) -> Result<()> {
    if !force && has_unsaved_changes(store.data()) {
        bail!(
            "Unsaved selection changes would be discarded by loading '{}'; \
             save them first or re-run with --force",
            id
        );
    }
    store.load_resume_version(id)
}

fn backup_after_save(store: &Store) {
    let storage = store.storage();
    if storage.has_backing_file() {
        if let Err(e) = Storage::export_json(store.data(), &storage.backup_dir()) {
            eprintln!("Warning: failed to write backup: {e:#}");
        }
    }
    if let Err(e) = storage.mark_last_saved() {
        eprintln!("Warning: failed to record save time: {e:#}");
    }
}

/// Reminder line for the preview and status output. Present only while
/// unsaved changes exist and the last save is older than `window` (or there
/// has never been one).
pub fn stale_save_reminder(storage: &Storage, data: &AppData, window: Duration) -> Option<String> {
    if !has_unsaved_changes(data) {
        return None;
    }
    let fresh = storage
        .last_saved()
        .ok()
        .flatten()
        .is_some_and(|stamp| Utc::now() - stamp < window);
    if fresh {
        return None;
    }
    Some(format!(
        "Unsaved changes - nothing saved in the last {} minute(s)",
        window.num_minutes().max(1)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn seeded_store() -> (Store, Vec<String>, String) {
        let mut store = Store::open_in_memory().unwrap();
        let company = store.add_company("Acme");
        let position = store.add_position(&company, "Engineer", "2020-01", None).unwrap();
        let project = store.add_project(&company, &position, "Website", None).unwrap();
        let bullets = vec![
            store
                .add_bullet(&company, &position, &project, "Shipped checkout flow", vec![])
                .unwrap(),
            store
                .add_bullet(&company, &position, &project, "Cut page load by 40%", vec![])
                .unwrap(),
        ];
        (store, bullets, company)
    }

    #[test]
    fn test_fresh_state_counts_as_unsaved() {
        let (store, _, _) = seeded_store();
        assert!(has_unsaved_changes(store.data()));
    }

    #[test]
    fn test_save_then_clean_then_drift() {
        let (mut store, bullets, _) = seeded_store();
        store.toggle_bullet_selection(&bullets[0]).unwrap();
        save_as_new(&mut store, "Backend Roles", None, vec![]).unwrap();
        assert!(!has_unsaved_changes(store.data()));
        store.toggle_bullet_selection(&bullets[1]).unwrap();
        assert!(has_unsaved_changes(store.data()));
    }

    #[test]
    fn test_load_blocks_on_unsaved_changes_without_force() {
        let (mut store, bullets, _) = seeded_store();
        store.toggle_bullet_selection(&bullets[0]).unwrap();
        let id = save_as_new(&mut store, "Backend Roles", None, vec![]).unwrap();
        store.toggle_bullet_selection(&bullets[1]).unwrap();
        assert!(load_version(&mut store, &id, false).is_err());
        // Still drifted: the blocked load changed nothing.
        assert!(has_unsaved_changes(store.data()));
        load_version(&mut store, &id, true).unwrap();
        assert!(!has_unsaved_changes(store.data()));
        let b1 = store.data().bullets.iter().find(|b| b.id == bullets[1]).unwrap();
        assert!(!b1.is_selected);
    }

    #[test]
    fn test_load_proceeds_when_clean() {
        let (mut store, _, _) = seeded_store();
        let id = save_as_new(&mut store, "Draft", None, vec![]).unwrap();
        load_version(&mut store, &id, false).unwrap();
    }

    #[test]
    fn test_deleted_version_leaves_dangling_pointer_and_unsaved_state() {
        let (mut store, _, _) = seeded_store();
        let id = save_as_new(&mut store, "Draft", None, vec![]).unwrap();
        assert!(!has_unsaved_changes(store.data()));
        store.delete_resume_version(&id).unwrap();
        assert!(has_unsaved_changes(store.data()));
        assert!(overwrite_current(&mut store).is_err());
    }

    #[test]
    fn test_overwrite_current_reuses_id() {
        let (mut store, bullets, _) = seeded_store();
        let id = save_as_new(&mut store, "Draft", None, vec![]).unwrap();
        store.toggle_bullet_selection(&bullets[0]).unwrap();
        let overwritten = overwrite_current(&mut store).unwrap();
        assert_eq!(overwritten, id);
        assert!(!has_unsaved_changes(store.data()));
        assert_eq!(store.data().resume_versions.len(), 1);
        assert_eq!(
            store.data().resume_versions[0].selected_bullets,
            vec![bullets[0].clone()]
        );
    }

    #[test]
    fn test_selection_state_compares_sorted() {
        let (mut store, bullets, _) = seeded_store();
        store.toggle_bullet_selection(&bullets[1]).unwrap();
        store.toggle_bullet_selection(&bullets[0]).unwrap();
        let state = SelectionState::capture(store.data());
        let mut expected = bullets.clone();
        expected.sort();
        assert_eq!(state.selected_bullets, expected);
    }

    #[test]
    fn test_stale_reminder_only_when_unsaved_and_old() {
        let (mut store, bullets, _) = seeded_store();
        // Unsaved and never saved: reminder fires.
        assert!(stale_save_reminder(store.storage(), store.data(), Duration::minutes(2)).is_some());
        save_as_new(&mut store, "Draft", None, vec![]).unwrap();
        // Clean: no reminder regardless of the stamp.
        assert!(stale_save_reminder(store.storage(), store.data(), Duration::minutes(2)).is_none());
        store.toggle_bullet_selection(&bullets[0]).unwrap();
        // Unsaved again, but the save stamp is fresh.
        assert!(stale_save_reminder(store.storage(), store.data(), Duration::minutes(2)).is_none());
        // With a zero-length window the stamp is always stale.
        assert!(stale_save_reminder(store.storage(), store.data(), Duration::zero()).is_some());
    }
}
