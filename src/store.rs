use anyhow::{anyhow, bail, Result};
use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::models::{
    AppData, Bullet, BulletVersion, Certification, Company, CurrentEditing, Education, Position,
    Project, ResumeVersion, Skill, Summary, SummaryVersion, Tag,
};
use crate::storage::Storage;

/// Owns the aggregate and exposes every mutation as a method. One instance per
/// session; all callers go through it, so there is never a second writer.
/// Every mutation persists the whole aggregate immediately; a failed write is
/// logged and the in-memory state stays authoritative.
pub struct Store {
    data: AppData,
    storage: Storage,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!(
        "{}-{}{}",
        prefix,
        Utc::now().timestamp_millis(),
        suffix.to_lowercase()
    )
}

/// Reorder `items` to match `ids`, which must be a permutation of the current
/// id set. Anything added, dropped, or duplicated is rejected and the order is
/// left untouched.
fn reorder_by_ids<T, F>(items: &mut [T], ids: &[String], id_of: F) -> Result<()>
where
    F: Fn(&T) -> &str,
{
    let current: HashSet<&str> = items.iter().map(|item| id_of(item)).collect();
    let proposed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    if ids.len() != items.len() || proposed != current {
        bail!("New order must list every existing id exactly once");
    }
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    items.sort_by_key(|item| index.get(id_of(item)).copied().unwrap_or(usize::MAX));
    Ok(())
}

impl Store {
    pub fn open() -> Result<Self> {
        let storage = Storage::open()?;
        storage.ensure_initialized()?;
        let data = match storage.load() {
            Ok(Some(data)) => data,
            Ok(None) => AppData::default(),
            Err(e) => {
                eprintln!("Warning: failed to load stored data: {e:#}");
                AppData::default()
            }
        };
        Ok(Self { data, storage })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        Ok(Self {
            data: AppData::default(),
            storage: Storage::open_in_memory()?,
        })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Wholesale replacement, used by import. Callers parse first so a bad
    /// file never gets this far.
    pub fn replace_data(&mut self, data: AppData) {
        self.data = data;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.data) {
            eprintln!("Warning: failed to persist data: {e:#}");
        }
    }

    // --- Lookup helpers ---

    fn company_mut(&mut self, id: &str) -> Result<&mut Company> {
        self.data
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow!("Company '{}' not found", id))
    }

    fn position_mut(&mut self, company_id: &str, position_id: &str) -> Result<&mut Position> {
        self.company_mut(company_id)?
            .positions
            .iter_mut()
            .find(|p| p.id == position_id)
            .ok_or_else(|| anyhow!("Position '{}' not found in company '{}'", position_id, company_id))
    }

    fn project_mut(
        &mut self,
        company_id: &str,
        position_id: &str,
        project_id: &str,
    ) -> Result<&mut Project> {
        self.position_mut(company_id, position_id)?
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| anyhow!("Project '{}' not found in position '{}'", project_id, position_id))
    }

    fn bullet_mut(&mut self, id: &str) -> Result<&mut Bullet> {
        self.data
            .bullets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| anyhow!("Bullet '{}' not found", id))
    }

    fn summary_mut(&mut self, id: &str) -> Result<&mut Summary> {
        self.data
            .summaries
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow!("Summary '{}' not found", id))
    }

    // --- Company operations ---

    pub fn add_company(&mut self, name: &str) -> String {
        // Duplicate names are permitted; ids are what distinguish companies.
        let id = new_id("company");
        self.data.companies.push(Company {
            id: id.clone(),
            name: name.to_string(),
            positions: Vec::new(),
            is_visible: true,
        });
        self.persist();
        id
    }

    pub fn rename_company(&mut self, id: &str, name: &str) -> Result<()> {
        self.company_mut(id)?.name = name.to_string();
        self.persist();
        Ok(())
    }

    /// Removes the company and every bullet that references it. Positions and
    /// projects are embedded, so they go with it.
    pub fn delete_company(&mut self, id: &str) -> Result<()> {
        let before = self.data.companies.len();
        self.data.companies.retain(|c| c.id != id);
        if self.data.companies.len() == before {
            bail!("Company '{}' not found", id);
        }
        self.data.bullets.retain(|b| b.company_id != id);
        self.persist();
        Ok(())
    }

    pub fn toggle_company_visibility(&mut self, id: &str) -> Result<bool> {
        let company = self.company_mut(id)?;
        company.is_visible = !company.is_visible;
        let visible = company.is_visible;
        self.persist();
        Ok(visible)
    }

    pub fn reorder_companies(&mut self, ids: &[String]) -> Result<()> {
        reorder_by_ids(&mut self.data.companies, ids, |c| &c.id)?;
        self.persist();
        Ok(())
    }

    // --- Position operations ---

    pub fn add_position(
        &mut self,
        company_id: &str,
        title: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<String> {
        let id = new_id("position");
        let position = Position {
            id: id.clone(),
            title: title.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.map(str::to_string),
            projects: Vec::new(),
        };
        self.company_mut(company_id)?.positions.push(position);
        self.persist();
        Ok(id)
    }

    pub fn update_position(
        &mut self,
        company_id: &str,
        position_id: &str,
        title: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        present: bool,
    ) -> Result<()> {
        let position = self.position_mut(company_id, position_id)?;
        if let Some(title) = title {
            position.title = title.to_string();
        }
        if let Some(start) = start_date {
            position.start_date = start.to_string();
        }
        if present {
            position.end_date = None;
        } else if let Some(end) = end_date {
            position.end_date = Some(end.to_string());
        }
        self.persist();
        Ok(())
    }

    /// Removes the position and every bullet that references it, across all of
    /// its projects.
    pub fn delete_position(&mut self, company_id: &str, position_id: &str) -> Result<()> {
        let company = self.company_mut(company_id)?;
        let before = company.positions.len();
        company.positions.retain(|p| p.id != position_id);
        if company.positions.len() == before {
            bail!("Position '{}' not found in company '{}'", position_id, company_id);
        }
        self.data.bullets.retain(|b| b.position_id != position_id);
        self.persist();
        Ok(())
    }

    pub fn reorder_positions(&mut self, company_id: &str, ids: &[String]) -> Result<()> {
        let company = self.company_mut(company_id)?;
        reorder_by_ids(&mut company.positions, ids, |p| &p.id)?;
        self.persist();
        Ok(())
    }

    // --- Project operations ---

    pub fn add_project(
        &mut self,
        company_id: &str,
        position_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<String> {
        let id = new_id("project");
        let project = Project {
            id: id.clone(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_visible: true,
        };
        self.position_mut(company_id, position_id)?.projects.push(project);
        self.persist();
        Ok(id)
    }

    pub fn update_project(
        &mut self,
        company_id: &str,
        position_id: &str,
        project_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let project = self.project_mut(company_id, position_id, project_id)?;
        if let Some(name) = name {
            project.name = name.to_string();
        }
        if let Some(description) = description {
            project.description = Some(description.to_string());
        }
        self.persist();
        Ok(())
    }

    pub fn delete_project(
        &mut self,
        company_id: &str,
        position_id: &str,
        project_id: &str,
    ) -> Result<()> {
        let position = self.position_mut(company_id, position_id)?;
        let before = position.projects.len();
        position.projects.retain(|p| p.id != project_id);
        if position.projects.len() == before {
            bail!("Project '{}' not found in position '{}'", project_id, position_id);
        }
        self.data.bullets.retain(|b| b.project_id != project_id);
        self.persist();
        Ok(())
    }

    pub fn toggle_project_visibility(
        &mut self,
        company_id: &str,
        position_id: &str,
        project_id: &str,
    ) -> Result<bool> {
        let project = self.project_mut(company_id, position_id, project_id)?;
        project.is_visible = !project.is_visible;
        let visible = project.is_visible;
        self.persist();
        Ok(visible)
    }

    // --- Bullet operations ---

    /// Creates a bullet under an existing company/position/project path with a
    /// single `v1` version entry.
    pub fn add_bullet(
        &mut self,
        company_id: &str,
        position_id: &str,
        project_id: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<String> {
        // Validate the full path so the foreign keys always point somewhere.
        self.project_mut(company_id, position_id, project_id)?;
        let id = new_id("bullet");
        let stamp = now();
        self.data.bullets.push(Bullet {
            id: id.clone(),
            content: content.to_string(),
            version: "v1".to_string(),
            versions: vec![BulletVersion {
                version: "v1".to_string(),
                content: content.to_string(),
                tags: tags.clone(),
                created_at: stamp.clone(),
            }],
            selected_version: Some("v1".to_string()),
            tags,
            project_id: project_id.to_string(),
            position_id: position_id.to_string(),
            company_id: company_id.to_string(),
            is_selected: false,
            created_at: stamp.clone(),
            updated_at: stamp,
        });
        self.persist();
        Ok(id)
    }

    pub fn delete_bullet(&mut self, id: &str) -> Result<()> {
        let before = self.data.bullets.len();
        self.data.bullets.retain(|b| b.id != id);
        if self.data.bullets.len() == before {
            bail!("Bullet '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    pub fn toggle_bullet_selection(&mut self, id: &str) -> Result<bool> {
        let bullet = self.bullet_mut(id)?;
        bullet.is_selected = !bullet.is_selected;
        let selected = bullet.is_selected;
        self.persist();
        Ok(selected)
    }

    /// Edit the current version in place. The entry named by the
    /// selected-version pointer is overwritten; `versions` never grows here.
    pub fn patch_bullet(
        &mut self,
        id: &str,
        content: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<()> {
        let stamp = now();
        let bullet = self.bullet_mut(id)?;
        if let Some(content) = content {
            bullet.content = content.to_string();
        }
        if let Some(tags) = &tags {
            bullet.tags = tags.clone();
        }
        let label = bullet
            .selected_version
            .clone()
            .unwrap_or_else(|| bullet.version.clone());
        if let Some(entry) = bullet.versions.iter_mut().find(|v| v.version == label) {
            if let Some(content) = content {
                entry.content = content.to_string();
            }
            if let Some(tags) = tags {
                entry.tags = tags;
            }
        }
        bullet.updated_at = stamp;
        self.persist();
        Ok(())
    }

    /// Edit as a new version: appends `v{count+1}` and selects it. Returns the
    /// new label.
    pub fn revise_bullet(
        &mut self,
        id: &str,
        content: &str,
        tags: Option<Vec<String>>,
    ) -> Result<String> {
        let stamp = now();
        let bullet = self.bullet_mut(id)?;
        let label = format!("v{}", bullet.versions.len() + 1);
        let tags = tags.unwrap_or_else(|| bullet.tags.clone());
        bullet.versions.push(BulletVersion {
            version: label.clone(),
            content: content.to_string(),
            tags: tags.clone(),
            created_at: stamp.clone(),
        });
        bullet.version = label.clone();
        bullet.selected_version = Some(label.clone());
        bullet.content = content.to_string();
        bullet.tags = tags;
        bullet.updated_at = stamp;
        self.persist();
        Ok(label)
    }

    /// Point the bullet at one of its existing version entries and mirror that
    /// entry's content/tags into the top-level fields.
    pub fn select_bullet_version(&mut self, id: &str, label: &str) -> Result<()> {
        let stamp = now();
        let bullet = self.bullet_mut(id)?;
        let entry = bullet
            .versions
            .iter()
            .find(|v| v.version == label)
            .ok_or_else(|| anyhow!("Bullet '{}' has no version '{}'", id, label))?
            .clone();
        bullet.selected_version = Some(entry.version.clone());
        bullet.version = entry.version;
        bullet.content = entry.content;
        bullet.tags = entry.tags;
        bullet.updated_at = stamp;
        self.persist();
        Ok(())
    }

    /// Global bullet order; relative order within a project is what renders.
    pub fn reorder_bullets(&mut self, ids: &[String]) -> Result<()> {
        reorder_by_ids(&mut self.data.bullets, ids, |b| &b.id)?;
        self.persist();
        Ok(())
    }

    // --- Summary operations ---

    pub fn add_summary(&mut self, name: &str, content: &str) -> String {
        let id = new_id("summary");
        let stamp = now();
        self.data.summaries.push(Summary {
            id: id.clone(),
            name: name.to_string(),
            version: "v1".to_string(),
            content: content.to_string(),
            versions: vec![SummaryVersion {
                version: "v1".to_string(),
                content: content.to_string(),
                tags: Vec::new(),
                created_at: stamp.clone(),
            }],
            selected_version: Some("v1".to_string()),
            tags: Vec::new(),
            is_selected: false,
            created_at: stamp.clone(),
            updated_at: stamp,
        });
        self.persist();
        id
    }

    pub fn delete_summary(&mut self, id: &str) -> Result<()> {
        let before = self.data.summaries.len();
        self.data.summaries.retain(|s| s.id != id);
        if self.data.summaries.len() == before {
            bail!("Summary '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    /// Update top-level fields; when `version_label` names an existing version
    /// entry, that entry is overwritten in place and selected.
    pub fn patch_summary(
        &mut self,
        id: &str,
        content: Option<&str>,
        tags: Option<Vec<String>>,
        version_label: Option<&str>,
    ) -> Result<()> {
        let stamp = now();
        let summary = self.summary_mut(id)?;
        if let Some(content) = content {
            summary.content = content.to_string();
        }
        if let Some(tags) = &tags {
            summary.tags = tags.clone();
        }
        if let Some(label) = version_label {
            if let Some(entry) = summary.versions.iter_mut().find(|v| v.version == label) {
                if let Some(content) = content {
                    entry.content = content.to_string();
                }
                if let Some(tags) = tags {
                    entry.tags = tags;
                }
                summary.selected_version = Some(label.to_string());
                summary.version = label.to_string();
            }
        }
        summary.updated_at = stamp;
        self.persist();
        Ok(())
    }

    /// Always appends a new version entry and makes it current.
    pub fn save_new_summary_version(
        &mut self,
        id: &str,
        content: &str,
        tags: Option<Vec<String>>,
    ) -> Result<String> {
        let stamp = now();
        let summary = self.summary_mut(id)?;
        let label = format!("v{}", summary.versions.len() + 1);
        let tags = tags.unwrap_or_else(|| summary.tags.clone());
        summary.versions.push(SummaryVersion {
            version: label.clone(),
            content: content.to_string(),
            tags: tags.clone(),
            created_at: stamp.clone(),
        });
        summary.version = label.clone();
        summary.selected_version = Some(label.clone());
        summary.content = content.to_string();
        summary.tags = tags;
        summary.updated_at = stamp;
        self.persist();
        Ok(label)
    }

    pub fn select_summary_version(&mut self, id: &str, label: &str) -> Result<()> {
        let stamp = now();
        let summary = self.summary_mut(id)?;
        let entry = summary
            .versions
            .iter()
            .find(|v| v.version == label)
            .ok_or_else(|| anyhow!("Summary '{}' has no version '{}'", id, label))?
            .clone();
        summary.selected_version = Some(entry.version.clone());
        summary.version = entry.version;
        summary.content = entry.content;
        summary.tags = entry.tags;
        summary.updated_at = stamp;
        self.persist();
        Ok(())
    }

    /// Radio semantics: selecting one deselects every other summary.
    pub fn select_summary(&mut self, id: &str) -> Result<()> {
        if !self.data.summaries.iter().any(|s| s.id == id) {
            bail!("Summary '{}' not found", id);
        }
        for summary in &mut self.data.summaries {
            summary.is_selected = summary.id == id;
        }
        self.persist();
        Ok(())
    }

    // --- Tag operations ---

    pub fn add_tag(&mut self, name: &str, color: &str) -> String {
        // No name dedup here; duplicate names are representable and callers
        // may warn before adding one.
        let id = new_id("tag");
        self.data.tags.push(Tag {
            id: id.clone(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: now(),
        });
        self.persist();
        id
    }

    /// Removes the tag record only. Bullets, summaries, and resume versions
    /// keep the name in their tag lists; renderers fall back to a bare label
    /// when the color lookup misses.
    pub fn delete_tag(&mut self, id: &str) -> Result<()> {
        let before = self.data.tags.len();
        self.data.tags.retain(|t| t.id != id);
        if self.data.tags.len() == before {
            bail!("Tag '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    // --- Education / skill / certification operations ---

    pub fn add_education(
        &mut self,
        degree: &str,
        institution: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> String {
        let id = new_id("education");
        self.data.education.push(Education {
            id: id.clone(),
            degree: degree.to_string(),
            institution: institution.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.map(str::to_string),
        });
        self.persist();
        id
    }

    pub fn update_education(
        &mut self,
        id: &str,
        degree: Option<&str>,
        institution: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        present: bool,
    ) -> Result<()> {
        let education = self
            .data
            .education
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow!("Education '{}' not found", id))?;
        if let Some(degree) = degree {
            education.degree = degree.to_string();
        }
        if let Some(institution) = institution {
            education.institution = institution.to_string();
        }
        if let Some(start) = start_date {
            education.start_date = start.to_string();
        }
        if present {
            education.end_date = None;
        } else if let Some(end) = end_date {
            education.end_date = Some(end.to_string());
        }
        self.persist();
        Ok(())
    }

    pub fn delete_education(&mut self, id: &str) -> Result<()> {
        let before = self.data.education.len();
        self.data.education.retain(|e| e.id != id);
        if self.data.education.len() == before {
            bail!("Education '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    pub fn add_skill(&mut self, name: &str) -> String {
        let id = new_id("skill");
        self.data.skills.push(Skill {
            id: id.clone(),
            name: name.to_string(),
        });
        self.persist();
        id
    }

    pub fn update_skill(&mut self, id: &str, name: &str) -> Result<()> {
        let skill = self
            .data
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow!("Skill '{}' not found", id))?;
        skill.name = name.to_string();
        self.persist();
        Ok(())
    }

    pub fn delete_skill(&mut self, id: &str) -> Result<()> {
        let before = self.data.skills.len();
        self.data.skills.retain(|s| s.id != id);
        if self.data.skills.len() == before {
            bail!("Skill '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    pub fn add_certification(
        &mut self,
        name: &str,
        issuer: Option<&str>,
        date: Option<&str>,
    ) -> String {
        let id = new_id("cert");
        self.data.certifications.push(Certification {
            id: id.clone(),
            name: name.to_string(),
            issuer: issuer.map(str::to_string),
            date: date.map(str::to_string),
        });
        self.persist();
        id
    }

    pub fn update_certification(
        &mut self,
        id: &str,
        name: Option<&str>,
        issuer: Option<&str>,
        date: Option<&str>,
    ) -> Result<()> {
        let cert = self
            .data
            .certifications
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow!("Certification '{}' not found", id))?;
        if let Some(name) = name {
            cert.name = name.to_string();
        }
        if let Some(issuer) = issuer {
            cert.issuer = Some(issuer.to_string());
        }
        if let Some(date) = date {
            cert.date = Some(date.to_string());
        }
        self.persist();
        Ok(())
    }

    pub fn delete_certification(&mut self, id: &str) -> Result<()> {
        let before = self.data.certifications.len();
        self.data.certifications.retain(|c| c.id != id);
        if self.data.certifications.len() == before {
            bail!("Certification '{}' not found", id);
        }
        self.persist();
        Ok(())
    }

    // --- Resume version operations ---

    /// Appends a snapshot and repoints current editing at it.
    pub fn save_resume_version(
        &mut self,
        name: &str,
        description: Option<&str>,
        tags: Vec<String>,
        summary_id: Option<String>,
        selected_bullets: Vec<String>,
        selected_companies: Vec<String>,
    ) -> String {
        let id = new_id("rv");
        let stamp = now();
        self.data.resume_versions.push(ResumeVersion {
            id: id.clone(),
            name: name.to_string(),
            description: description.map(str::to_string),
            tags,
            summary_id,
            selected_bullets,
            selected_companies,
            created_at: stamp.clone(),
            updated_at: stamp,
        });
        self.data.current_editing = CurrentEditing {
            resume_version_id: Some(id.clone()),
            resume_name: name.to_string(),
        };
        self.persist();
        id
    }

    pub fn update_resume_version(&mut self, id: &str, patch: ResumeVersionPatch) -> Result<()> {
        let stamp = now();
        let version = self
            .data
            .resume_versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| anyhow!("Resume version '{}' not found", id))?;
        if let Some(name) = patch.name {
            version.name = name;
        }
        if let Some(description) = patch.description {
            version.description = Some(description);
        }
        if let Some(tags) = patch.tags {
            version.tags = tags;
        }
        if let Some(summary_id) = patch.summary_id {
            version.summary_id = summary_id;
        }
        if let Some(selected_bullets) = patch.selected_bullets {
            version.selected_bullets = selected_bullets;
        }
        if let Some(selected_companies) = patch.selected_companies {
            version.selected_companies = selected_companies;
        }
        version.updated_at = stamp;
        self.persist();
        Ok(())
    }

    /// Destructive overwrite of the live selection state: summary selection,
    /// bullet inclusion, and company visibility all snap to the snapshot.
    pub fn load_resume_version(&mut self, id: &str) -> Result<()> {
        let version = self
            .data
            .resume_versions
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| anyhow!("Resume version '{}' not found", id))?
            .clone();
        for summary in &mut self.data.summaries {
            summary.is_selected = version.summary_id.as_deref() == Some(summary.id.as_str());
        }
        for bullet in &mut self.data.bullets {
            bullet.is_selected = version.selected_bullets.contains(&bullet.id);
        }
        for company in &mut self.data.companies {
            company.is_visible = version.selected_companies.contains(&company.id);
        }
        self.data.current_editing = CurrentEditing {
            resume_version_id: Some(version.id.clone()),
            resume_name: version.name.clone(),
        };
        self.persist();
        Ok(())
    }

    /// Removes the snapshot only. A `currentEditing` pointer at the deleted
    /// version is left dangling; the unsaved-changes check tolerates it.
    pub fn delete_resume_version(&mut self, id: &str) -> Result<()> {
        let before = self.data.resume_versions.len();
        self.data.resume_versions.retain(|v| v.id != id);
        if self.data.resume_versions.len() == before {
            bail!("Resume version '{}' not found", id);
        }
        self.persist();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ResumeVersionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary_id: Option<Option<String>>,
    pub selected_bullets: Option<Vec<String>>,
    pub selected_companies: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    struct SeededIds {
        company: String,
        position: String,
        project: String,
        bullets: Vec<String>,
    }

    fn seed(store: &mut Store) -> SeededIds {
        let company = store.add_company("Acme");
        let position = store
            .add_position(&company, "Engineer", "2020-01", None)
            .unwrap();
        let project = store
            .add_project(&company, &position, "Website", Some("Storefront rebuild"))
            .unwrap();
        let bullets = vec![
            store
                .add_bullet(&company, &position, &project, "Shipped checkout flow", vec![])
                .unwrap(),
            store
                .add_bullet(&company, &position, &project, "Cut page load by 40%", vec![])
                .unwrap(),
        ];
        SeededIds {
            company,
            position,
            project,
            bullets,
        }
    }

    #[test]
    fn test_delete_company_cascades_bullets() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let other = store.add_company("Globex");
        store.delete_company(&ids.company).unwrap();
        assert!(store.data().companies.iter().all(|c| c.id == other));
        assert!(store.data().bullets.iter().all(|b| b.company_id != ids.company));
        assert!(store.data().bullets.is_empty());
    }

    #[test]
    fn test_delete_position_cascades_bullets_across_projects() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let second_project = store
            .add_project(&ids.company, &ids.position, "Infra", None)
            .unwrap();
        store
            .add_bullet(&ids.company, &ids.position, &second_project, "Moved CI to runners", vec![])
            .unwrap();
        store.delete_position(&ids.company, &ids.position).unwrap();
        assert!(store.data().bullets.is_empty());
        assert!(store.data().companies[0].positions.is_empty());
    }

    #[test]
    fn test_delete_project_cascades_only_its_bullets() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let second_project = store
            .add_project(&ids.company, &ids.position, "Infra", None)
            .unwrap();
        let kept = store
            .add_bullet(&ids.company, &ids.position, &second_project, "Moved CI to runners", vec![])
            .unwrap();
        store
            .delete_project(&ids.company, &ids.position, &ids.project)
            .unwrap();
        assert_eq!(store.data().bullets.len(), 1);
        assert_eq!(store.data().bullets[0].id, kept);
    }

    #[test]
    fn test_add_bullet_requires_existing_path() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let result = store.add_bullet(&ids.company, &ids.position, "nope", "text", vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_bullet_starts_at_v1_with_one_version() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let bullet = &store.data().bullets[0];
        assert_eq!(bullet.version, "v1");
        assert_eq!(bullet.selected_version.as_deref(), Some("v1"));
        assert_eq!(bullet.versions.len(), 1);
        assert_eq!(bullet.versions[0].content, "Shipped checkout flow");
        drop(ids);
    }

    #[test]
    fn test_revise_bullet_appends_exactly_one_version() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let id = &ids.bullets[0];
        let label = store.revise_bullet(id, "Shipped checkout flow end to end", None).unwrap();
        assert_eq!(label, "v2");
        let bullet = store.data().bullets.iter().find(|b| b.id == *id).unwrap();
        assert_eq!(bullet.versions.len(), 2);
        assert_eq!(bullet.version, "v2");
        assert_eq!(bullet.selected_version.as_deref(), Some("v2"));
        assert_eq!(bullet.content, "Shipped checkout flow end to end");
        // The pointer always names a real entry.
        assert!(bullet.versions.iter().any(|v| v.version == bullet.version));
    }

    #[test]
    fn test_patch_bullet_overwrites_in_place() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let id = &ids.bullets[0];
        store.revise_bullet(id, "second draft", None).unwrap();
        store.patch_bullet(id, Some("second draft, polished"), None).unwrap();
        let bullet = store.data().bullets.iter().find(|b| b.id == *id).unwrap();
        assert_eq!(bullet.versions.len(), 2);
        assert_eq!(bullet.versions[1].content, "second draft, polished");
        assert_eq!(bullet.content, "second draft, polished");
        // v1 untouched
        assert_eq!(bullet.versions[0].content, "Shipped checkout flow");
    }

    #[test]
    fn test_select_bullet_version_mirrors_entry() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let id = &ids.bullets[0];
        store.revise_bullet(id, "second draft", None).unwrap();
        store.select_bullet_version(id, "v1").unwrap();
        let bullet = store.data().bullets.iter().find(|b| b.id == *id).unwrap();
        assert_eq!(bullet.selected_version.as_deref(), Some("v1"));
        assert_eq!(bullet.content, "Shipped checkout flow");
        assert!(store.select_bullet_version(id, "v9").is_err());
    }

    #[test]
    fn test_select_summary_is_single_select() {
        let mut store = test_store();
        let a = store.add_summary("Lead", "Led teams.");
        let b = store.add_summary("IC", "Built systems.");
        store.select_summary(&a).unwrap();
        store.select_summary(&b).unwrap();
        let selected: Vec<&str> = store
            .data()
            .summaries
            .iter()
            .filter(|s| s.is_selected)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(selected, vec![b.as_str()]);
    }

    #[test]
    fn test_save_new_summary_version_appends_and_selects() {
        let mut store = test_store();
        let id = store.add_summary("Lead", "Led teams.");
        let label = store
            .save_new_summary_version(&id, "Led teams of 12.", None)
            .unwrap();
        assert_eq!(label, "v2");
        let summary = &store.data().summaries[0];
        assert_eq!(summary.versions.len(), 2);
        assert_eq!(summary.content, "Led teams of 12.");
        assert_eq!(summary.selected_version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_patch_summary_with_label_overwrites_that_entry() {
        let mut store = test_store();
        let id = store.add_summary("Lead", "Led teams.");
        store.save_new_summary_version(&id, "Led teams of 12.", None).unwrap();
        store
            .patch_summary(&id, Some("Led teams, original cut"), None, Some("v1"))
            .unwrap();
        let summary = &store.data().summaries[0];
        assert_eq!(summary.versions[0].content, "Led teams, original cut");
        assert_eq!(summary.selected_version.as_deref(), Some("v1"));
        assert_eq!(summary.versions.len(), 2);
    }

    #[test]
    fn test_patch_summary_unknown_label_only_updates_top_level() {
        let mut store = test_store();
        let id = store.add_summary("Lead", "Led teams.");
        store
            .patch_summary(&id, Some("Edited"), None, Some("v7"))
            .unwrap();
        let summary = &store.data().summaries[0];
        assert_eq!(summary.content, "Edited");
        assert_eq!(summary.versions[0].content, "Led teams.");
        assert_eq!(summary.selected_version.as_deref(), Some("v1"));
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut store = test_store();
        let a = store.add_company("Acme");
        let b = store.add_company("Globex");
        // Dropped id
        assert!(store.reorder_companies(&[a.clone()]).is_err());
        // Foreign id
        assert!(store
            .reorder_companies(&[a.clone(), "company-bogus".to_string()])
            .is_err());
        // Duplicate id
        assert!(store.reorder_companies(&[a.clone(), a.clone()]).is_err());
        // Order unchanged after rejections
        assert_eq!(store.data().companies[0].id, a);
        assert_eq!(store.data().companies[1].id, b);
        // A real permutation goes through
        store.reorder_companies(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(store.data().companies[0].id, b);
    }

    #[test]
    fn test_toggle_visibility_flips_default_true_to_false() {
        let mut store = test_store();
        let ids = seed(&mut store);
        assert!(!store.toggle_company_visibility(&ids.company).unwrap());
        assert!(store.toggle_company_visibility(&ids.company).unwrap());
        assert!(!store
            .toggle_project_visibility(&ids.company, &ids.position, &ids.project)
            .unwrap());
    }

    #[test]
    fn test_delete_tag_leaves_orphaned_names_on_bullets() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let tag_id = store.add_tag("Leadership", "#3b82f6");
        for bullet_id in &ids.bullets {
            store
                .patch_bullet(bullet_id, None, Some(vec!["Leadership".to_string()]))
                .unwrap();
        }
        store.delete_tag(&tag_id).unwrap();
        assert!(store.data().tags.is_empty());
        for bullet in &store.data().bullets {
            assert_eq!(bullet.tags, vec!["Leadership".to_string()]);
        }
    }

    #[test]
    fn test_load_resume_version_overwrites_selection() {
        let mut store = test_store();
        let ids = seed(&mut store);
        let extra = store
            .add_bullet(&ids.company, &ids.position, &ids.project, "Third thing", vec![])
            .unwrap();
        store.toggle_bullet_selection(&extra).unwrap();
        let summary = store.add_summary("Lead", "Led teams.");
        let version_id = store.save_resume_version(
            "Backend Roles",
            None,
            vec![],
            Some(summary.clone()),
            ids.bullets.clone(),
            vec![ids.company.clone()],
        );
        // Drift the live state, then load the snapshot back.
        store.toggle_bullet_selection(&ids.bullets[0]).unwrap();
        store.load_resume_version(&version_id).unwrap();
        let bullets = &store.data().bullets;
        assert!(bullets.iter().find(|b| b.id == ids.bullets[0]).unwrap().is_selected);
        assert!(bullets.iter().find(|b| b.id == ids.bullets[1]).unwrap().is_selected);
        assert!(!bullets.iter().find(|b| b.id == extra).unwrap().is_selected);
        assert!(store.data().summaries[0].is_selected);
        assert_eq!(
            store.data().current_editing.resume_version_id.as_deref(),
            Some(version_id.as_str())
        );
        assert_eq!(store.data().current_editing.resume_name, "Backend Roles");
    }

    #[test]
    fn test_delete_resume_version_leaves_pointer_dangling() {
        let mut store = test_store();
        let version_id = store.save_resume_version("Draft", None, vec![], None, vec![], vec![]);
        store.delete_resume_version(&version_id).unwrap();
        assert!(store.data().resume_versions.is_empty());
        assert_eq!(
            store.data().current_editing.resume_version_id.as_deref(),
            Some(version_id.as_str())
        );
    }

    #[test]
    fn test_update_resume_version_merges_and_restamps() {
        let mut store = test_store();
        let id = store.save_resume_version("Draft", Some("first cut"), vec![], None, vec![], vec![]);
        store
            .update_resume_version(
                &id,
                ResumeVersionPatch {
                    name: Some("Final".to_string()),
                    selected_bullets: Some(vec!["b1".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let version = &store.data().resume_versions[0];
        assert_eq!(version.name, "Final");
        assert_eq!(version.description.as_deref(), Some("first cut"));
        assert_eq!(version.selected_bullets, vec!["b1".to_string()]);
    }
}
