use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::export::Contact;
use crate::projection::ResumeView;

// US Letter, point units.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const BOTTOM: f32 = 54.0;

const NAME_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const BODY_LEAD: f32 = 13.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const OBLIQUE: &str = "F3";

// Base-14 fonts carry no metrics table; an average glyph width approximates
// text extent for wrapping and right alignment.
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_CHAR_WIDTH_EM
}

fn wrap_to_width(text: &str, width: f32, size: f32) -> Vec<String> {
    let columns = ((width / (size * AVG_CHAR_WIDTH_EM)) as usize).max(1);
    textwrap::wrap(text, columns)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// The base-14 fonts are declared with WinAnsiEncoding; anything outside it
/// degrades to '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '•' => 0x95,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || ((c as u32) >= 0xa0 && (c as u32) <= 0xff) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Vertical cursor over a growing list of pages. Text always lands on the
/// current page; crossing the bottom threshold starts a new one.
struct PageFlow {
    done: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < BOTTOM {
            self.break_page();
        }
    }

    fn text(&mut self, x: f32, font: &str, size: f32, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), self.y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn text_right(&mut self, font: &str, size: f32, text: &str) {
        let x = PAGE_WIDTH - MARGIN - text_width(text, size);
        self.text(x, font, size, text);
    }

    fn rule(&mut self) {
        self.ops.extend([
            Operation::new("w", vec![0.5f32.into()]),
            Operation::new("m", vec![MARGIN.into(), self.y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), self.y.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    /// Wrapped body text at `x`; breaks pages between lines.
    fn paragraph(&mut self, x: f32, font: &str, text: &str) {
        let width = PAGE_WIDTH - MARGIN - x;
        for line in wrap_to_width(text, width, BODY_SIZE) {
            self.ensure_room(BODY_LEAD);
            self.text(x, font, BODY_SIZE, &line);
            self.advance(BODY_LEAD);
        }
    }

    fn heading(&mut self, text: &str) {
        self.ensure_room(40.0);
        self.text(MARGIN, BOLD, HEADING_SIZE, text);
        self.advance(18.0);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.done.push(self.ops);
        self.done
    }
}

fn layout(view: &ResumeView, contact: &Contact) -> Vec<Vec<Operation>> {
    let mut flow = PageFlow::new();

    flow.text(MARGIN, BOLD, NAME_SIZE, &contact.name);
    flow.advance(20.0);
    flow.text(MARGIN, REGULAR, BODY_SIZE, &contact.contact_line());
    flow.advance(14.0);
    flow.rule();
    flow.advance(20.0);

    if let Some(summary) = &view.summary {
        flow.heading("Summary");
        flow.paragraph(MARGIN, REGULAR, &summary.content);
        flow.advance(8.0);
    }

    if !view.companies.is_empty() {
        flow.heading("Work Experience");
        for company in &view.companies {
            for position in &company.positions {
                flow.ensure_room(40.0);
                flow.text(MARGIN, BOLD, BODY_SIZE, &company.name);
                flow.text_right(REGULAR, BODY_SIZE, &position.dates);
                flow.advance(BODY_LEAD);
                flow.text(MARGIN, BOLD, BODY_SIZE, &position.title);
                flow.advance(BODY_LEAD + 2.0);
                for project in &position.projects {
                    if project.heading_visible {
                        flow.ensure_room(BODY_LEAD);
                        let heading = match &project.description {
                            Some(description) => format!("{} - {}", project.name, description),
                            None => project.name.clone(),
                        };
                        flow.text(MARGIN, OBLIQUE, BODY_SIZE, &heading);
                        flow.advance(BODY_LEAD);
                    }
                    for bullet in &project.bullets {
                        flow.paragraph(MARGIN + 14.0, REGULAR, &format!("• {bullet}"));
                    }
                }
                flow.advance(8.0);
            }
        }
    }

    if !view.education.is_empty() {
        flow.heading("Education");
        for education in &view.education {
            flow.ensure_room(2.0 * BODY_LEAD);
            flow.text(MARGIN, BOLD, BODY_SIZE, &education.degree);
            flow.text_right(REGULAR, BODY_SIZE, &education.dates);
            flow.advance(BODY_LEAD);
            flow.text(MARGIN, REGULAR, BODY_SIZE, &education.institution);
            flow.advance(BODY_LEAD + 4.0);
        }
    }

    if !view.skills.is_empty() {
        flow.heading("Skills");
        flow.paragraph(MARGIN, REGULAR, &view.skills.join(", "));
        flow.advance(8.0);
    }

    if !view.certifications.is_empty() {
        flow.heading("Certifications");
        for cert in &view.certifications {
            let mut line = cert.name.clone();
            if let Some(issuer) = &cert.issuer {
                line.push_str(&format!(", {issuer}"));
            }
            if let Some(date) = &cert.date {
                line.push_str(&format!(" ({date})"));
            }
            flow.paragraph(MARGIN, REGULAR, &line);
        }
    }

    flow.finish()
}

fn font(doc: &mut Document, base: &str) -> Object {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
    .into()
}

/// Render the projection as PDF bytes. Pure apart from allocation; the CLI
/// decides where the bytes go.
pub fn render_pdf(view: &ResumeView, contact: &Contact) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let oblique = font(&mut doc, "Helvetica-Oblique");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
            OBLIQUE => oblique,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in layout(view, contact) {
        let content = Content { operations };
        let stream_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{CompanySection, PositionSection, ProjectSection, SummarySection};

    fn view_with_bullets(count: usize) -> ResumeView {
        ResumeView {
            summary: Some(SummarySection {
                name: "Lead".to_string(),
                content: "Led teams.".to_string(),
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
                        bullets: (0..count)
                            .map(|i| format!("Bullet number {i} describing a fairly long achievement"))
                            .collect(),
                    }],
                }],
            }],
            education: vec![],
            skills: vec!["Rust".to_string()],
            certifications: vec![],
        }
    }

    #[test]
    fn test_pdf_magic_and_single_page() {
        let bytes = render_pdf(&view_with_bullets(3), &Contact::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_resume_breaks_onto_more_pages() {
        let bytes = render_pdf(&view_with_bullets(120), &Contact::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_win_ansi_maps_bullet_and_degrades_unknown() {
        assert_eq!(win_ansi("• a"), vec![0x95, b' ', b'a']);
        assert_eq!(win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_wrap_to_width_never_returns_empty_columns() {
        // A narrow width still yields at least one column per line.
        let lines = wrap_to_width("word another", 1.0, BODY_SIZE);
        assert!(!lines.is_empty());
    }
}
