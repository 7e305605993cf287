use std::io::{Cursor, Write};

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::export::Contact;
use crate::projection::ResumeView;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

// Run sizes are half-points.
const NAME_SIZE: u32 = 36;
const HEADING_SIZE: u32 = 26;
const BODY_SIZE: u32 = 20;

struct Run {
    text: String,
    bold: bool,
    italic: bool,
    size: u32,
    tab_before: bool,
}

impl Run {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            size: BODY_SIZE,
            tab_before: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    fn sized(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    fn after_tab(mut self) -> Self {
        self.tab_before = true;
        self
    }
}

fn heading(text: &str) -> Vec<Run> {
    vec![Run::bold(text).sized(HEADING_SIZE)]
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_paragraph(xml: &mut XmlWriter, runs: &[Run], indent_left: Option<u32>) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("w:p")))?;
    if let Some(indent) = indent_left {
        xml.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        let mut ind = BytesStart::new("w:ind");
        ind.push_attribute(("w:left", indent.to_string().as_str()));
        xml.write_event(Event::Empty(ind))?;
        xml.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }
    for run in runs {
        xml.write_event(Event::Start(BytesStart::new("w:r")))?;
        xml.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if run.bold {
            xml.write_event(Event::Empty(BytesStart::new("w:b")))?;
        }
        if run.italic {
            xml.write_event(Event::Empty(BytesStart::new("w:i")))?;
        }
        let mut sz = BytesStart::new("w:sz");
        sz.push_attribute(("w:val", run.size.to_string().as_str()));
        xml.write_event(Event::Empty(sz))?;
        xml.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        if run.tab_before {
            xml.write_event(Event::Empty(BytesStart::new("w:tab")))?;
        }
        let mut text = BytesStart::new("w:t");
        text.push_attribute(("xml:space", "preserve"));
        xml.write_event(Event::Start(text))?;
        xml.write_event(Event::Text(BytesText::new(&run.text)))?;
        xml.write_event(Event::End(BytesEnd::new("w:t")))?;
        xml.write_event(Event::End(BytesEnd::new("w:r")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn document_xml(view: &ResumeView, contact: &Contact) -> Result<Vec<u8>> {
    let mut xml = Writer::new(Cursor::new(Vec::new()));
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", W_NS));
    xml.write_event(Event::Start(document))?;
    xml.write_event(Event::Start(BytesStart::new("w:body")))?;

    write_paragraph(&mut xml, &[Run::bold(&contact.name).sized(NAME_SIZE)], None)?;
    write_paragraph(&mut xml, &[Run::plain(contact.contact_line())], None)?;
    write_paragraph(&mut xml, &[], None)?;

    if let Some(summary) = &view.summary {
        write_paragraph(&mut xml, &heading("Summary"), None)?;
        write_paragraph(&mut xml, &[Run::plain(&summary.content)], None)?;
    }

    if !view.companies.is_empty() {
        write_paragraph(&mut xml, &heading("Work Experience"), None)?;
        for company in &view.companies {
            for position in &company.positions {
                write_paragraph(
                    &mut xml,
                    &[
                        Run::bold(&company.name),
                        Run::plain(&position.dates).after_tab(),
                    ],
                    None,
                )?;
                write_paragraph(&mut xml, &[Run::bold(&position.title)], None)?;
                for project in &position.projects {
                    if project.heading_visible {
                        let text = match &project.description {
                            Some(description) => format!("{} - {}", project.name, description),
                            None => project.name.clone(),
                        };
                        write_paragraph(&mut xml, &[Run::italic(text)], None)?;
                    }
                    for bullet in &project.bullets {
                        write_paragraph(
                            &mut xml,
                            &[Run::plain(format!("• {bullet}"))],
                            Some(360),
                        )?;
                    }
                }
                write_paragraph(&mut xml, &[], None)?;
            }
        }
    }

    if !view.education.is_empty() {
        write_paragraph(&mut xml, &heading("Education"), None)?;
        for education in &view.education {
            write_paragraph(
                &mut xml,
                &[
                    Run::bold(&education.degree),
                    Run::plain(&education.dates).after_tab(),
                ],
                None,
            )?;
            write_paragraph(&mut xml, &[Run::plain(&education.institution)], None)?;
        }
    }

    if !view.skills.is_empty() {
        write_paragraph(&mut xml, &heading("Skills"), None)?;
        write_paragraph(&mut xml, &[Run::plain(view.skills.join(", "))], None)?;
    }

    if !view.certifications.is_empty() {
        write_paragraph(&mut xml, &heading("Certifications"), None)?;
        for cert in &view.certifications {
            let mut runs = vec![Run::bold(&cert.name)];
            let mut detail = String::new();
            if let Some(issuer) = &cert.issuer {
                detail.push_str(&format!(", {issuer}"));
            }
            if let Some(date) = &cert.date {
                detail.push_str(&format!(" ({date})"));
            }
            if !detail.is_empty() {
                runs.push(Run::plain(detail));
            }
            write_paragraph(&mut xml, &runs, None)?;
        }
    }

    xml.write_event(Event::End(BytesEnd::new("w:body")))?;
    xml.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(xml.into_inner().into_inner())
}

/// Render the projection as a DOCX package: the document part plus the two
/// boilerplate parts every consumer requires, zipped.
pub fn render_docx(view: &ResumeView, contact: &Contact) -> Result<Vec<u8>> {
    let document = document_xml(view, contact)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(RELS_XML.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(&document)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{CompanySection, PositionSection, ProjectSection, SummarySection};
    use std::io::Read;

    fn sample_view() -> ResumeView {
        ResumeView {
            summary: Some(SummarySection {
                name: "Lead".to_string(),
                content: "Led teams & projects.".to_string(),
            }),
            companies: vec![CompanySection {
                name: "Acme".to_string(),
                positions: vec![PositionSection {
                    title: "Engineer".to_string(),
                    dates: "Jan 2020 - Present".to_string(),
                    projects: vec![ProjectSection {
                        name: "Website".to_string(),
                        description: None,
                        heading_visible: true,
                        bullets: vec!["Shipped checkout flow".to_string()],
                    }],
                }],
            }],
            education: vec![],
            skills: vec!["Rust".to_string()],
            certifications: vec![],
        }
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render_docx(&sample_view(), &Contact::default()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"[Content_Types].xml".to_string()));
        assert!(names.contains(&"_rels/.rels".to_string()));
        assert!(names.contains(&"word/document.xml".to_string()));
    }

    #[test]
    fn test_document_contains_rendered_content() {
        let bytes = render_docx(&sample_view(), &Contact::default()).unwrap();
        let document = read_entry(&bytes, "word/document.xml");
        assert!(document.contains("John Doe"));
        assert!(document.contains("Shipped checkout flow"));
        assert!(document.contains("Jan 2020 - Present"));
        assert!(document.contains("<w:b/>"));
        assert!(document.contains("<w:i/>"));
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let bytes = render_docx(&sample_view(), &Contact::default()).unwrap();
        let document = read_entry(&bytes, "word/document.xml");
        assert!(document.contains("Led teams &amp; projects."));
    }

    #[test]
    fn test_hidden_project_heading_is_absent() {
        let mut view = sample_view();
        view.companies[0].positions[0].projects[0].heading_visible = false;
        let bytes = render_docx(&view, &Contact::default()).unwrap();
        let document = read_entry(&bytes, "word/document.xml");
        assert!(!document.contains("Website"));
        assert!(document.contains("Shipped checkout flow"));
    }
}
