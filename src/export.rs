use anyhow::{anyhow, Result};

use crate::projection::ResumeView;

/// Contact header for rendered documents. Not part of the persisted
/// aggregate; defaults are placeholders the CLI flags override.
#[derive(Debug, Clone)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "john.doe@email.com".to_string(),
            phone: "(555) 123-4567".to_string(),
            location: "San Francisco, CA".to_string(),
        }
    }
}

impl Contact {
    pub fn contact_line(&self) -> String {
        format!("{} • {} • {}", self.email, self.phone, self.location)
    }
}

pub fn default_output_name(extension: &str) -> String {
    format!("resume.{extension}")
}

/// Two-column `Section,Content` table. Every field is quote-wrapped and
/// embedded quotes are doubled, so bullets survive a round trip through any
/// CSV reader.
pub fn to_csv(view: &ResumeView) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());
    writer.write_record(["Section", "Content"])?;

    if let Some(summary) = &view.summary {
        writer.write_record(["Summary", summary.content.as_str()])?;
    }

    for company in &view.companies {
        for position in &company.positions {
            writer.write_record(["Company", company.name.as_str()])?;
            writer.write_record(["Position", position.title.as_str()])?;
            writer.write_record(["Dates", position.dates.as_str()])?;
            for project in &position.projects {
                if project.heading_visible {
                    writer.write_record(["Project", project.name.as_str()])?;
                }
                for bullet in &project.bullets {
                    writer.write_record(["Bullet", bullet.as_str()])?;
                }
            }
        }
    }

    for education in &view.education {
        writer.write_record(["Education", education.degree.as_str()])?;
        writer.write_record(["Institution", education.institution.as_str()])?;
        writer.write_record(["Dates", education.dates.as_str()])?;
    }

    if !view.skills.is_empty() {
        writer.write_record(["Skills", view.skills.join(", ").as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// Plain-text rendering for `tailor show`; same section walk as the document
/// exporters.
pub fn to_text(view: &ResumeView, contact: &Contact) -> String {
    let mut out = String::new();
    out.push_str(&contact.name);
    out.push('\n');
    out.push_str(&contact.contact_line());
    out.push('\n');
    out.push_str(&"=".repeat(60));
    out.push('\n');

    if let Some(summary) = &view.summary {
        out.push_str("\nSUMMARY\n");
        out.push_str(&textwrap::fill(&summary.content, 60));
        out.push('\n');
    }

    if !view.companies.is_empty() {
        out.push_str("\nWORK EXPERIENCE\n");
        for company in &view.companies {
            for position in &company.positions {
                out.push_str(&format!("\n{}  ({})\n", company.name, position.dates));
                out.push_str(&format!("{}\n", position.title));
                for project in &position.projects {
                    if project.heading_visible {
                        match &project.description {
                            Some(description) => {
                                out.push_str(&format!("  {} - {}\n", project.name, description))
                            }
                            None => out.push_str(&format!("  {}\n", project.name)),
                        }
                    }
                    for bullet in &project.bullets {
                        for (i, line) in textwrap::wrap(bullet, 54).iter().enumerate() {
                            if i == 0 {
                                out.push_str(&format!("    - {line}\n"));
                            } else {
                                out.push_str(&format!("      {line}\n"));
                            }
                        }
                    }
                }
            }
        }
    }

    if !view.education.is_empty() {
        out.push_str("\nEDUCATION\n");
        for education in &view.education {
            out.push_str(&format!("{}  ({})\n", education.degree, education.dates));
            out.push_str(&format!("{}\n", education.institution));
        }
    }

    if !view.skills.is_empty() {
        out.push_str("\nSKILLS\n");
        out.push_str(&textwrap::fill(&view.skills.join(", "), 60));
        out.push('\n');
    }

    if !view.certifications.is_empty() {
        out.push_str("\nCERTIFICATIONS\n");
        for cert in &view.certifications {
            out.push_str(&cert.name);
            if let Some(issuer) = &cert.issuer {
                out.push_str(&format!(", {issuer}"));
            }
            if let Some(date) = &cert.date {
                out.push_str(&format!(" ({date})"));
            }
            out.push('\n');
        }
    }

    out
}
