use crate::models::{AppData, Bullet, Summary};

/// Render-ready view of the current selection state. Recomputed from the
/// aggregate on demand; nothing here is cached or mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeView {
    pub summary: Option<SummarySection>,
    pub companies: Vec<CompanySection>,
    pub education: Vec<EducationLine>,
    pub skills: Vec<String>,
    pub certifications: Vec<CertificationLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySection {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanySection {
    pub name: String,
    pub positions: Vec<PositionSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSection {
    pub title: String,
    pub dates: String,
    pub projects: Vec<ProjectSection>,
}

/// A project only appears when it has at least one selected bullet. The
/// heading is suppressed for hidden projects; the bullets still render.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSection {
    pub name: String,
    pub description: Option<String>,
    pub heading_visible: bool,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationLine {
    pub degree: String,
    pub institution: String,
    pub dates: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationLine {
    pub name: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
}

pub fn date_range(start: &str, end: Option<&str>) -> String {
    format!("{} - {}", start, end.unwrap_or("Present"))
}

/// The bullet's selected version wins; the top-level content field is the
/// fallback when the pointer dangles or no version entry exists.
pub fn resolve_bullet_content(bullet: &Bullet) -> String {
    let label = bullet
        .selected_version
        .as_deref()
        .unwrap_or(&bullet.version);
    bullet
        .versions
        .iter()
        .find(|v| v.version == label)
        .map(|v| v.content.clone())
        .unwrap_or_else(|| bullet.content.clone())
}

fn resolve_summary_content(summary: &Summary) -> String {
    let label = summary
        .selected_version
        .as_deref()
        .unwrap_or(&summary.version);
    summary
        .versions
        .iter()
        .find(|v| v.version == label)
        .map(|v| v.content.clone())
        .unwrap_or_else(|| summary.content.clone())
}

/// Derive the current resume from the aggregate. Pure; consumed by the
/// preview and every exporter so they all agree on what is in the resume.
pub fn project_resume(data: &AppData) -> ResumeView {
    let summary = data.summaries.iter().find(|s| s.is_selected).map(|s| SummarySection {
        name: s.name.clone(),
        content: resolve_summary_content(s),
    });

    let selected_bullets: Vec<&Bullet> = data.bullets.iter().filter(|b| b.is_selected).collect();

    let companies = data
        .companies
        .iter()
        .filter(|c| c.is_visible)
        .map(|company| CompanySection {
            name: company.name.clone(),
            positions: company
                .positions
                .iter()
                .map(|position| PositionSection {
                    title: position.title.clone(),
                    dates: date_range(&position.start_date, position.end_date.as_deref()),
                    projects: position
                        .projects
                        .iter()
                        .filter_map(|project| {
                            let bullets: Vec<String> = selected_bullets
                                .iter()
                                .filter(|b| b.project_id == project.id)
                                .map(|b| resolve_bullet_content(b))
                                .collect();
                            if bullets.is_empty() {
                                // No selected bullets means no section, even
                                // for a visible project.
                                return None;
                            }
                            Some(ProjectSection {
                                name: project.name.clone(),
                                description: project.description.clone(),
                                heading_visible: project.is_visible,
                                bullets,
                            })
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let education = data
        .education
        .iter()
        .map(|e| EducationLine {
            degree: e.degree.clone(),
            institution: e.institution.clone(),
            dates: date_range(&e.start_date, e.end_date.as_deref()),
        })
        .collect();

    let skills = data.skills.iter().map(|s| s.name.clone()).collect();

    let certifications = data
        .certifications
        .iter()
        .map(|c| CertificationLine {
            name: c.name.clone(),
            issuer: c.issuer.clone(),
            date: c.date.clone(),
        })
        .collect();

    ResumeView {
        summary,
        companies,
        education,
        skills,
        certifications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BulletVersion, Company, Position, Project, Summary, SummaryVersion};

    fn bullet(id: &str, project_id: &str, content: &str, selected: bool) -> Bullet {
        Bullet {
            id: id.to_string(),
            content: content.to_string(),
            version: "v1".to_string(),
            versions: vec![BulletVersion {
                version: "v1".to_string(),
                content: content.to_string(),
                tags: vec![],
                created_at: "2024-01-01T00:00:00Z".to_string(),
            }],
            selected_version: Some("v1".to_string()),
            tags: vec![],
            project_id: project_id.to_string(),
            position_id: "pos1".to_string(),
            company_id: "c1".to_string(),
            is_selected: selected,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn acme() -> AppData {
        AppData {
            companies: vec![Company {
                id: "c1".to_string(),
                name: "Acme".to_string(),
                is_visible: true,
                positions: vec![Position {
                    id: "pos1".to_string(),
                    title: "Engineer".to_string(),
                    start_date: "Jan 2020".to_string(),
                    end_date: None,
                    projects: vec![Project {
                        id: "p1".to_string(),
                        name: "Website".to_string(),
                        description: None,
                        is_visible: true,
                    }],
                }],
            }],
            bullets: vec![
                bullet("b1", "p1", "Shipped checkout flow", true),
                bullet("b2", "p1", "Cut page load by 40%", false),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_acme_scenario_projects_single_selected_bullet() {
        let view = project_resume(&acme());
        assert_eq!(view.companies.len(), 1);
        assert_eq!(view.companies[0].name, "Acme");
        assert_eq!(view.companies[0].positions.len(), 1);
        let position = &view.companies[0].positions[0];
        assert_eq!(position.dates, "Jan 2020 - Present");
        assert_eq!(position.projects.len(), 1);
        assert_eq!(position.projects[0].bullets, vec!["Shipped checkout flow".to_string()]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let data = acme();
        assert_eq!(project_resume(&data), project_resume(&data));
    }

    #[test]
    fn test_hidden_company_is_excluded() {
        let mut data = acme();
        data.companies[0].is_visible = false;
        let view = project_resume(&data);
        assert!(view.companies.is_empty());
    }

    #[test]
    fn test_project_without_selected_bullets_is_omitted() {
        let mut data = acme();
        for b in &mut data.bullets {
            b.is_selected = false;
        }
        let view = project_resume(&data);
        assert!(view.companies[0].positions[0].projects.is_empty());
    }

    #[test]
    fn test_hidden_project_keeps_bullets_but_not_heading() {
        let mut data = acme();
        data.companies[0].positions[0].projects[0].is_visible = false;
        let view = project_resume(&data);
        let project = &view.companies[0].positions[0].projects[0];
        assert!(!project.heading_visible);
        assert_eq!(project.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_resolves_selected_version() {
        let mut data = acme();
        let b = &mut data.bullets[0];
        b.versions.push(BulletVersion {
            version: "v2".to_string(),
            content: "Shipped checkout end to end".to_string(),
            tags: vec![],
            created_at: "2024-02-01T00:00:00Z".to_string(),
        });
        b.selected_version = Some("v2".to_string());
        let view = project_resume(&data);
        assert_eq!(
            view.companies[0].positions[0].projects[0].bullets[0],
            "Shipped checkout end to end"
        );
    }

    #[test]
    fn test_dangling_version_pointer_falls_back_to_content() {
        let mut data = acme();
        data.bullets[0].selected_version = Some("v9".to_string());
        data.bullets[0].content = "Fallback text".to_string();
        let view = project_resume(&data);
        assert_eq!(view.companies[0].positions[0].projects[0].bullets[0], "Fallback text");
    }

    #[test]
    fn test_selected_summary_resolves_version_content() {
        let mut data = acme();
        data.summaries.push(Summary {
            id: "s1".to_string(),
            name: "Lead".to_string(),
            version: "v1".to_string(),
            content: "stale mirror".to_string(),
            versions: vec![
                SummaryVersion {
                    version: "v1".to_string(),
                    content: "Led teams.".to_string(),
                    tags: vec![],
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                },
                SummaryVersion {
                    version: "v2".to_string(),
                    content: "Led teams of 12.".to_string(),
                    tags: vec![],
                    created_at: "2024-02-01T00:00:00Z".to_string(),
                },
            ],
            selected_version: Some("v2".to_string()),
            tags: vec![],
            is_selected: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        });
        let view = project_resume(&data);
        assert_eq!(view.summary.as_ref().unwrap().content, "Led teams of 12.");
    }

    #[test]
    fn test_no_selected_summary_means_no_summary_section() {
        let view = project_resume(&acme());
        assert!(view.summary.is_none());
    }
}
