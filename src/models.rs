use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String, // hex string, e.g. "#3b82f6"
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub positions: Vec<Position>,
    // Absent in blobs written before visibility existed; absent means visible.
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: Option<String>, // None = "Present"
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletVersion {
    pub version: String, // "v1", "v2", ...
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub id: String,
    pub content: String, // mirrors the selected version's content
    pub version: String,
    #[serde(default)]
    pub versions: Vec<BulletVersion>,
    pub selected_version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>, // tag names, not ids; may outlive the tag record
    pub project_id: String,
    pub position_id: String,
    pub company_id: String,
    #[serde(default)]
    pub is_selected: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryVersion {
    pub version: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub content: String,
    #[serde(default)]
    pub versions: Vec<SummaryVersion>,
    pub selected_version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_selected: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeVersion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary_id: Option<String>,
    #[serde(default)]
    pub selected_bullets: Vec<String>,
    #[serde(default)]
    pub selected_companies: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEditing {
    pub resume_version_id: Option<String>,
    pub resume_name: String,
}

impl Default for CurrentEditing {
    fn default() -> Self {
        Self {
            resume_version_id: None,
            resume_name: "Untitled Resume".to_string(),
        }
    }
}

/// The single aggregate root. Serialized wholesale; there are no partial
/// updates at the storage boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
    #[serde(default)]
    pub summaries: Vec<Summary>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub resume_versions: Vec<ResumeVersion>,
    #[serde(default)]
    pub current_editing: CurrentEditing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_visibility_flag_means_visible() {
        let json = r#"{
            "id": "c1",
            "name": "Acme",
            "positions": []
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert!(company.is_visible);
    }

    #[test]
    fn test_camel_case_field_names() {
        let bullet = Bullet {
            id: "b1".to_string(),
            content: "Did things".to_string(),
            version: "v1".to_string(),
            versions: vec![],
            selected_version: Some("v1".to_string()),
            tags: vec![],
            project_id: "p1".to_string(),
            position_id: "pos1".to_string(),
            company_id: "c1".to_string(),
            is_selected: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&bullet).unwrap();
        assert!(json.contains("\"projectId\""));
        assert!(json.contains("\"selectedVersion\""));
        assert!(json.contains("\"isSelected\""));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_empty_blob_deserializes_to_defaults() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert!(data.companies.is_empty());
        assert!(data.resume_versions.is_empty());
        assert_eq!(data.current_editing.resume_name, "Untitled Resume");
        assert!(data.current_editing.resume_version_id.is_none());
    }
}
