//! Category dialog - search, chips, filter inputs and the checklist
//!
//! The dialog renders the draft selection of one category. Every edit is
//! emitted as an Action; the dialog is re-synced from the draft before each
//! draw, so its lists always mirror the session state.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::catalog::{Catalog, Category, FilterKind};
use crate::model::criteria::FilterValue;
use crate::model::selection::Selection;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Part of the dialog receiving keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Search,
    Chips,
    Inputs,
    #[default]
    List,
}

/// Selectable entry of the checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub key: String,
    pub label: String,
    pub checked: bool,
}

/// Selected key shown as a deletable chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipEntry {
    pub key: String,
    pub label: String,
}

/// Input of a configured filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    pub id: String,
    pub label: String,
    pub kind: FilterKind,
    pub value: FilterValue,
}

/// Dialog editing one category of the draft selection
pub struct CategoryDialog {
    pub category: Category,
    pub search: String,
    pub focus: Focus,
    pub items: Vec<ChecklistItem>,
    pub chips: Vec<ChipEntry>,
    pub inputs: Vec<InputEntry>,
    chip_index: usize,
    input_index: usize,
    list_state: ListState,
}

impl Default for CategoryDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryDialog {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            category: Category::Dimensions,
            search: String::new(),
            focus: Focus::default(),
            items: Vec::new(),
            chips: Vec::new(),
            inputs: Vec::new(),
            chip_index: 0,
            input_index: 0,
            list_state,
        }
    }

    /// Reset local state for a freshly opened category
    pub fn open(&mut self, category: Category) {
        self.category = category;
        self.search.clear();
        self.focus = Focus::List;
        self.chip_index = 0;
        self.input_index = 0;
        self.list_state.select(Some(0));
    }

    /// Mirror the draft selection
    pub fn sync(&mut self, selection: &Selection, catalog: &Catalog) {
        let category = self.category;

        self.items = selection
            .search(catalog, category, &self.search)
            .into_iter()
            .map(|entry| ChecklistItem {
                key: entry.key.to_string(),
                label: entry.label.to_string(),
                checked: selection.is_checked(category, entry.key),
            })
            .collect();

        self.chips = selection
            .selected_chips(catalog, category)
            .into_iter()
            .map(|entry| ChipEntry {
                key: entry.key.to_string(),
                label: entry.label.to_string(),
            })
            .collect();

        self.inputs = if category == Category::Filters {
            selection
                .configured_filters(catalog, &self.search)
                .into_iter()
                .map(|input| InputEntry {
                    id: input.id.to_string(),
                    label: input.label.to_string(),
                    kind: input.kind,
                    value: input.value,
                })
                .collect()
        } else {
            Vec::new()
        };

        self.chip_index = self.chip_index.min(self.chips.len().saturating_sub(1));
        self.input_index = self.input_index.min(self.inputs.len().saturating_sub(1));
        let selected = self.selected_index().min(self.items.len().saturating_sub(1));
        self.list_state.select(Some(selected));

        if !self.focus_available(self.focus) {
            self.focus = Focus::List;
        }
    }

    pub fn selected_index(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    pub fn selected_item(&self) -> Option<&ChecklistItem> {
        self.items.get(self.selected_index())
    }

    fn focus_available(&self, focus: Focus) -> bool {
        match focus {
            Focus::Search | Focus::List => true,
            Focus::Chips => !self.chips.is_empty(),
            Focus::Inputs => !self.inputs.is_empty(),
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        const ORDER: [Focus; 4] = [Focus::Search, Focus::Chips, Focus::Inputs, Focus::List];
        let mut idx = ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        loop {
            idx = if forward {
                (idx + 1) % ORDER.len()
            } else {
                (idx + ORDER.len() - 1) % ORDER.len()
            };
            if self.focus_available(ORDER[idx]) {
                self.focus = ORDER[idx];
                return;
            }
        }
    }

    fn select_next(&mut self) {
        let idx = self.selected_index();
        if idx + 1 < self.items.len() {
            self.list_state.select(Some(idx + 1));
        }
    }

    fn select_prev(&mut self) {
        let idx = self.selected_index();
        self.list_state.select(Some(idx.saturating_sub(1)));
    }

    fn current_input(&self) -> Option<&InputEntry> {
        self.inputs.get(self.input_index)
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(c) => self.search.push(c),
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Enter | KeyCode::Down => self.focus = Focus::List,
            _ => {}
        }
        None
    }

    fn handle_chip_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.chip_index = self.chip_index.saturating_sub(1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.chip_index + 1 < self.chips.len() {
                    self.chip_index += 1;
                }
                None
            }
            KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x') => self
                .chips
                .get(self.chip_index)
                .map(|chip| Action::DeleteChip(chip.key.clone())),
            _ => None,
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up => {
                self.input_index = self.input_index.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.input_index + 1 < self.inputs.len() {
                    self.input_index += 1;
                }
                None
            }
            _ => {
                let input = self.current_input()?;
                match (input.kind, key.code) {
                    (FilterKind::DateRange, KeyCode::Enter) => {
                        Some(Action::OpenDateRangePicker(input.id.clone()))
                    }
                    (FilterKind::TextInput, KeyCode::Char(c)) => {
                        let mut text = input.value.as_text().unwrap_or_default().to_string();
                        text.push(c);
                        Some(Action::SetFilterText {
                            id: input.id.clone(),
                            text,
                        })
                    }
                    (FilterKind::TextInput, KeyCode::Backspace) => {
                        let mut text = input.value.as_text().unwrap_or_default().to_string();
                        text.pop();
                        Some(Action::SetFilterText {
                            id: input.id.clone(),
                            text,
                        })
                    }
                    _ => None,
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                None
            }
            KeyCode::Char(' ') => self
                .selected_item()
                .map(|item| Action::ToggleItem(item.key.clone())),
            KeyCode::Enter => Some(Action::ApplySelection),
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                None
            }
            _ => None,
        }
    }

    fn section_block(&self, title: &str, focus: Focus) -> Block<'static> {
        let color = if self.focus == focus {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", title))
    }

    fn draw_chips(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if self.chips.is_empty() {
            spans.push(Span::styled(
                " Nothing selected",
                Style::default().fg(Color::DarkGray),
            ));
        }
        for (i, chip) in self.chips.iter().enumerate() {
            let style = if self.focus == Focus::Chips && i == self.chip_index {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("[{} ×]", chip.label), style));
        }
        let paragraph =
            Paragraph::new(Line::from(spans)).block(self.section_block("Selected", Focus::Chips));
        frame.render_widget(paragraph, area);
    }

    fn draw_inputs(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let focused = self.focus == Focus::Inputs && i == self.input_index;
                let value = match input.kind {
                    FilterKind::TextInput => {
                        let text = input.value.as_text().unwrap_or_default();
                        if focused {
                            format!("{}_", text)
                        } else {
                            text.to_string()
                        }
                    }
                    FilterKind::DateRange => match input.value.as_date_range() {
                        Some(range) => format!("{} ▾", range.display()),
                        None => "Select a range ▾".to_string(),
                    },
                    FilterKind::Untyped => String::new(),
                };
                Line::from(vec![
                    Span::styled(
                        if focused { "▶ " } else { "  " },
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(
                        format!("{}: ", input.label),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(value, Style::default().fg(Color::White)),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(self.section_block("Values", Focus::Inputs));
        frame.render_widget(paragraph, area);
    }

    fn draw_list(&mut self, frame: &mut Frame, area: Rect) {
        let block = self.section_block(self.category.label(), Focus::List);

        if self.items.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                " No matching entries",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let (mark, color) = if item.checked {
                    ("[x] ", Color::Green)
                } else {
                    ("[ ] ", Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, Style::default().fg(color)),
                    Span::styled(item.label.clone(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();

        let highlight = if self.focus == Focus::List {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

impl Component for CategoryDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            let action = match key.code {
                KeyCode::Char('s') => Some(Action::ApplySelection),
                KeyCode::Char('x') => Some(Action::ClearCategory),
                KeyCode::Char('c') => Some(Action::ForceQuit),
                _ => None,
            };
            return Ok(action);
        }

        let action = match key.code {
            KeyCode::Esc => Some(Action::CancelSelection),
            KeyCode::Tab => {
                self.cycle_focus(true);
                None
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                None
            }
            _ => match self.focus {
                Focus::Search => self.handle_search_key(key),
                Focus::Chips => self.handle_chip_key(key),
                Focus::Inputs => self.handle_input_key(key),
                Focus::List => self.handle_list_key(key),
            },
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = area.height.saturating_sub(4).max(14);
        let popup_area = centered_popup(area, 64, height);
        frame.render_widget(Clear, popup_area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" Select {} ", self.category.label()))
            .title_style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = outer.inner(popup_area);
        frame.render_widget(outer, popup_area);

        let inputs_height = if self.inputs.is_empty() {
            0
        } else {
            self.inputs.len() as u16 + 2
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Search
                Constraint::Length(3),             // Chips
                Constraint::Length(inputs_height), // Filter values
                Constraint::Min(3),                // Checklist
                Constraint::Length(1),             // Help
            ])
            .split(inner);

        let cursor = if self.focus == Focus::Search { "_" } else { "" };
        let search = Paragraph::new(Line::from(vec![
            Span::styled(" / ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{}{}", self.search, cursor),
                Style::default().fg(Color::White),
            ),
        ]))
        .block(self.section_block("Search", Focus::Search));
        frame.render_widget(search, chunks[0]);

        self.draw_chips(frame, chunks[1]);
        if !self.inputs.is_empty() {
            self.draw_inputs(frame, chunks[2]);
        }
        self.draw_list(frame, chunks[3]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Space ", Style::default().fg(Color::Cyan)),
            Span::raw("Toggle  "),
            Span::styled(" Enter/^S ", Style::default().fg(Color::Green)),
            Span::raw("Apply  "),
            Span::styled(" ^X ", Style::default().fg(Color::Yellow)),
            Span::raw("Clear  "),
            Span::styled(" Tab ", Style::default().fg(Color::Cyan)),
            Span::raw("Focus  "),
            Span::styled(" Esc ", Style::default().fg(Color::Red)),
            Span::raw("Cancel"),
        ]))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, chunks[4]);

        Ok(())
    }
}
