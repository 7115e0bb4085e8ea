//! Date range picker for date filters
//!
//! Predefined ranges resolve immediately. `Custom` switches to a text input
//! that is validated when applied.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::date_range::{parse_custom_range, DateRange, DateRangePreset};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Picker state for one date filter
pub struct DateRangePicker {
    pub filter_id: String,
    pub filter_label: String,
    /// Range currently stored on the filter
    pub current: Option<DateRange>,
    /// Reference day the presets resolve against
    pub today: NaiveDate,
    pub custom_mode: bool,
    pub input: String,
    pub error: Option<String>,
    list_state: ListState,
}

impl DateRangePicker {
    pub fn new(today: NaiveDate) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            filter_id: String::new(),
            filter_label: String::new(),
            current: None,
            today,
            custom_mode: false,
            input: String::new(),
            error: None,
            list_state,
        }
    }

    /// Prepare the picker for a filter, preselecting its current preset
    pub fn open(&mut self, id: &str, label: &str, current: Option<&DateRange>, today: NaiveDate) {
        self.filter_id = id.to_string();
        self.filter_label = label.to_string();
        self.current = current.cloned();
        self.today = today;
        self.custom_mode = false;
        self.error = None;
        self.input = match current {
            Some(DateRange {
                start_date: Some(start),
                end_date: Some(end),
                ..
            }) => format!("{} to {}", start, end),
            _ => String::new(),
        };

        let selected = current
            .and_then(|range| DateRangePreset::from_label(&range.label))
            .and_then(|preset| DateRangePreset::all().iter().position(|p| *p == preset))
            .unwrap_or(0);
        self.list_state.select(Some(selected));
    }

    pub fn selected_preset(&self) -> DateRangePreset {
        let presets = DateRangePreset::all();
        presets[self.list_state.selected().unwrap_or(0).min(presets.len() - 1)]
    }

    fn emit(&self, range: DateRange) -> Action {
        Action::SetDateRange {
            id: self.filter_id.clone(),
            range,
        }
    }

    fn handle_custom_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.custom_mode = false;
                self.error = None;
                None
            }
            KeyCode::Enter => match parse_custom_range(&self.input, self.today) {
                Ok(range) => {
                    self.error = None;
                    Some(self.emit(range))
                }
                Err(e) => {
                    self.error = Some(e.to_string());
                    None
                }
            },
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
                None
            }
            _ => None,
        }
    }

    fn handle_preset_key(&mut self, key: KeyEvent) -> Option<Action> {
        let count = DateRangePreset::all().len();
        let idx = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_state.select(Some(idx.saturating_sub(1)));
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list_state.select(Some((idx + 1).min(count - 1)));
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let preset = self.selected_preset();
                match preset.resolve(self.today) {
                    Some(range) => Some(self.emit(range)),
                    None => {
                        self.custom_mode = true;
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

impl Component for DateRangePicker {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = if self.custom_mode {
            self.handle_custom_key(key)
        } else {
            self.handle_preset_key(key)
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 48, 17);
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Current value
                Constraint::Min(4),    // Presets
                Constraint::Length(3), // Custom input
            ])
            .split(popup_area);

        let current = self
            .current
            .as_ref()
            .map(DateRange::display)
            .unwrap_or_else(|| "Not set".to_string());
        let header = Paragraph::new(Line::from(Span::styled(
            current,
            Style::default().fg(Color::Cyan),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", self.filter_label))
                .title_style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
        );
        frame.render_widget(header, chunks[0]);

        let current_label = self.current.as_ref().map(|r| r.label.as_str());
        let items: Vec<ListItem> = DateRangePreset::all()
            .iter()
            .map(|preset| {
                let is_current = current_label == Some(preset.label());
                ListItem::new(Line::from(vec![
                    Span::styled(
                        if is_current { "● " } else { "  " },
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(preset.label(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if self.custom_mode {
                        Color::DarkGray
                    } else {
                        Color::Cyan
                    })),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let (text, style) = match (&self.error, self.custom_mode) {
            (Some(err), _) => (err.clone(), Style::default().fg(Color::Red)),
            (None, true) => (
                format!("{}_", self.input),
                Style::default().fg(Color::White),
            ),
            (None, false) => (
                "YYYY-MM-DD to YYYY-MM-DD".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        };
        let custom = Paragraph::new(Line::from(Span::styled(text, style))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if self.custom_mode {
                    Color::Cyan
                } else {
                    Color::DarkGray
                }))
                .title(" Custom "),
        );
        frame.render_widget(custom, chunks[2]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::date_range::CUSTOM_LABEL;
    use crossterm::event::KeyModifiers;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn picker() -> DateRangePicker {
        let today = day(2024, 3, 15);
        let mut picker = DateRangePicker::new(today);
        picker.open("created", "Created", None, today);
        picker
    }

    #[test]
    fn test_preset_resolves_on_enter() {
        let mut picker = picker();
        picker.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(picker.selected_preset(), DateRangePreset::Last7Days);

        let action = picker.handle_key_event(key(KeyCode::Enter)).unwrap();
        let expected = DateRangePreset::Last7Days.resolve(day(2024, 3, 15)).unwrap();
        assert_eq!(
            action,
            Some(Action::SetDateRange {
                id: "created".to_string(),
                range: expected
            })
        );
    }

    #[test]
    fn test_custom_input_validates_on_apply() {
        let mut picker = picker();
        for _ in 0..10 {
            picker.handle_key_event(key(KeyCode::Down)).unwrap();
        }
        assert_eq!(picker.selected_preset(), DateRangePreset::Custom);
        assert_eq!(picker.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
        assert!(picker.custom_mode);

        for c in "2024-03-10 to 2024-03-01".chars() {
            picker.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(picker.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
        assert!(picker.error.is_some());

        picker.input = "2024-03-01 to 2024-03-10".to_string();
        match picker.handle_key_event(key(KeyCode::Enter)).unwrap() {
            Some(Action::SetDateRange { id, range }) => {
                assert_eq!(id, "created");
                assert_eq!(range.label, CUSTOM_LABEL);
                assert_eq!(range.start_date, Some(day(2024, 3, 1)));
                assert_eq!(range.end_date, Some(day(2024, 3, 10)));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_open_preselects_current_range() {
        let today = day(2024, 3, 15);
        let mut picker = DateRangePicker::new(today);
        let current = DateRange::custom(day(2024, 1, 1), day(2024, 1, 31));
        picker.open("created", "Created", Some(&current), today);

        assert_eq!(picker.selected_preset(), DateRangePreset::Custom);
        assert_eq!(picker.input, "2024-01-01 to 2024-01-31");
    }

    #[test]
    fn test_escape_leaves_custom_mode_then_closes() {
        let mut picker = picker();
        picker.custom_mode = true;
        assert_eq!(picker.handle_key_event(key(KeyCode::Esc)).unwrap(), None);
        assert!(!picker.custom_mode);
        assert_eq!(
            picker.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::CloseModal)
        );
    }
}
