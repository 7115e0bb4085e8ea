//! Export button - triggers the CSV export and shows its outcome

use crate::action::Action;
use crate::component::Component;
use crate::services::ExportStatus;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Spinner frames shown while an export runs
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Default)]
pub struct ExportButton {
    pub status: ExportStatus,
    /// Target file of the next export
    pub filename: String,
    frame: usize,
}

impl ExportButton {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Default::default()
        }
    }

    pub fn set_status(&mut self, status: ExportStatus) {
        self.status = status;
    }

    pub fn is_disabled(&self) -> bool {
        self.status == ExportStatus::Running
    }

    fn status_spans(&self) -> Vec<Span<'static>> {
        match &self.status {
            ExportStatus::Idle => vec![Span::styled(
                format!("→ {}", self.filename),
                Style::default().fg(Color::DarkGray),
            )],
            ExportStatus::Running => vec![Span::styled(
                format!("{} Exporting...", SPINNER[self.frame % SPINNER.len()]),
                Style::default().fg(Color::Yellow),
            )],
            ExportStatus::Finished { path, rows } => vec![Span::styled(
                format!("✓ Exported {} rows to {}", rows, path.display()),
                Style::default().fg(Color::Green),
            )],
            ExportStatus::Failed(err) => vec![Span::styled(
                format!("✗ Export failed: {}", err),
                Style::default().fg(Color::Red),
            )],
        }
    }
}

impl Component for ExportButton {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Char('e') if !self.is_disabled() => Some(Action::Export),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action == Action::Tick && self.is_disabled() {
            self.frame = self.frame.wrapping_add(1);
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let label_style = if self.is_disabled() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        };

        let mut spans = vec![Span::styled(" e Export CSV ", label_style), Span::raw(" ")];
        spans.extend(self.status_spans());
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        Ok(())
    }
}
