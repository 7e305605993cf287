use anyhow::Result;
use chrono::Duration;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;

use crate::export::Contact;
use crate::projection::{self, ResumeView};
use crate::store::Store;
use crate::versions;

struct PreviewState {
    view: ResumeView,
    contact: Contact,
    resume_name: String,
    unsaved: bool,
    reminder: Option<String>,
    scroll_offset: u16,
}

impl PreviewState {
    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

/// Scrollable terminal rendering of the same projection the exporters use.
pub fn run_preview(store: &Store, contact: &Contact, stale_window: Duration) -> Result<()> {
    let data = store.data();
    let mut state = PreviewState {
        view: projection::project_resume(data),
        contact: contact.clone(),
        resume_name: data.current_editing.resume_name.clone(),
        unsaved: versions::has_unsaved_changes(data),
        reminder: versions::stale_save_reminder(store.storage(), data, stale_window),
        scroll_offset: 0,
    };

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut PreviewState,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.scroll_down(),
                KeyCode::Up | KeyCode::Char('k') => state.scroll_up(),
                KeyCode::PageDown | KeyCode::Char('J') => {
                    state.scroll_offset = state.scroll_offset.saturating_add(15)
                }
                KeyCode::PageUp | KeyCode::Char('K') => {
                    state.scroll_offset = state.scroll_offset.saturating_sub(15)
                }
                KeyCode::Char('g') | KeyCode::Home => state.scroll_offset = 0,
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &PreviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Status line: resume name plus save state
    let status = match (&state.reminder, state.unsaved) {
        (Some(reminder), _) => Line::from(Span::styled(
            format!(" {} | {}", state.resume_name, reminder),
            Style::default().fg(Color::Yellow),
        )),
        (None, true) => Line::from(format!(" {} | unsaved changes", state.resume_name)),
        (None, false) => Line::from(format!(" {} | saved", state.resume_name)),
    };
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let body = Paragraph::new(build_resume_text(state))
        .block(Block::default().borders(Borders::ALL).title(" Preview "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(body, chunks[1]);

    let help = Paragraph::new(" j/k:scroll  J/K:page  g:top  q:quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
    ))
}

fn build_resume_text(state: &PreviewState) -> Text<'_> {
    let view = &state.view;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        state.contact.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(state.contact.contact_line()));
    lines.push(Line::from(""));

    if let Some(summary) = &view.summary {
        lines.push(heading("SUMMARY"));
        for line in textwrap::fill(&summary.content, 76).lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(""));
    }

    if !view.companies.is_empty() {
        lines.push(heading("WORK EXPERIENCE"));
        for company in &view.companies {
            for position in &company.positions {
                lines.push(Line::from(vec![
                    Span::styled(
                        company.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("  ({})", position.dates)),
                ]));
                lines.push(Line::from(Span::styled(
                    position.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for project in &position.projects {
                    if project.heading_visible {
                        let text = match &project.description {
                            Some(description) => format!("  {} - {}", project.name, description),
                            None => format!("  {}", project.name),
                        };
                        lines.push(Line::from(Span::styled(
                            text,
                            Style::default().add_modifier(Modifier::ITALIC),
                        )));
                    }
                    for bullet in &project.bullets {
                        for (i, line) in textwrap::wrap(bullet, 70).iter().enumerate() {
                            if i == 0 {
                                lines.push(Line::from(format!("    - {line}")));
                            } else {
                                lines.push(Line::from(format!("      {line}")));
                            }
                        }
                    }
                }
                lines.push(Line::from(""));
            }
        }
    }

    if !view.education.is_empty() {
        lines.push(heading("EDUCATION"));
        for education in &view.education {
            lines.push(Line::from(vec![
                Span::styled(
                    education.degree.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  ({})", education.dates)),
            ]));
            lines.push(Line::from(education.institution.clone()));
        }
        lines.push(Line::from(""));
    }

    if !view.skills.is_empty() {
        lines.push(heading("SKILLS"));
        for line in textwrap::fill(&view.skills.join(", "), 76).lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(""));
    }

    if !view.certifications.is_empty() {
        lines.push(heading("CERTIFICATIONS"));
        for cert in &view.certifications {
            let mut text = cert.name.clone();
            if let Some(issuer) = &cert.issuer {
                text.push_str(&format!(", {issuer}"));
            }
            if let Some(date) = &cert.date {
                text.push_str(&format!(" ({date})"));
            }
            lines.push(Line::from(text));
        }
    }

    if lines.len() <= 3 {
        lines.push(Line::from(Span::styled(
            "(Nothing selected - toggle bullets and companies to build a resume)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    Text::from(lines)
}
