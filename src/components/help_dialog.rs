//! Help dialog listing the report's keyboard shortcuts

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let dialog_area = centered_popup(area, 64, area.height.saturating_sub(4));
        frame.render_widget(Clear, dialog_area);

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:12}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Toolbar");
    add_shortcut(&mut lines, "d", "Choose dimensions");
    add_shortcut(&mut lines, "m", "Choose metrics");
    add_shortcut(&mut lines, "f", "Choose filters");

    add_section(&mut lines, "Category Dialog");
    add_shortcut(&mut lines, "Tab", "Next section (search, chips, values, list)");
    add_shortcut(&mut lines, "Shift+Tab", "Previous section");
    add_shortcut(&mut lines, "/", "Search the list");
    add_shortcut(&mut lines, "j / k", "Move in the list");
    add_shortcut(&mut lines, "Space", "Check or uncheck");
    add_shortcut(&mut lines, "x / Del", "Remove the selected chip");
    add_shortcut(&mut lines, "Enter", "Apply (list) / open date picker");
    add_shortcut(&mut lines, "Ctrl+s", "Apply");
    add_shortcut(&mut lines, "Ctrl+x", "Clear the category");
    add_shortcut(&mut lines, "Esc", "Cancel");

    add_section(&mut lines, "Date Range Picker");
    add_shortcut(&mut lines, "Enter", "Use the highlighted range");
    add_shortcut(&mut lines, "Custom", "Type YYYY-MM-DD to YYYY-MM-DD");
    add_shortcut(&mut lines, "Esc", "Back");

    add_section(&mut lines, "Table");
    add_shortcut(&mut lines, "← / →", "Previous / next page");
    add_shortcut(&mut lines, "+ / -", "More / fewer rows per page");
    add_shortcut(&mut lines, "s", "Sort by the next column");
    add_shortcut(&mut lines, "r", "Reverse sort direction");

    add_section(&mut lines, "Report");
    add_shortcut(&mut lines, "e", "Export CSV");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_help_lists_report_shortcuts() {
        let text: String = build_help_content()
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Export CSV"));
        assert!(text.contains("Reverse sort direction"));
        assert!(text.contains("Clear the category"));
    }

    #[test]
    fn test_scroll_and_close() {
        let mut dialog = HelpDialog::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        dialog.handle_key_event(key(KeyCode::Up)).unwrap();
        assert_eq!(dialog.scroll_offset, 1);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('?'))).unwrap(),
            Some(Action::CloseModal)
        );
    }
}
