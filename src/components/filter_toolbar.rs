//! Filter toolbar - the Dimensions / Metrics / Filters chips
//!
//! Each chip shows how many keys are selected in its category and a short
//! summary of the selected labels.

use crate::action::Action;
use crate::component::Component;
use crate::model::catalog::{Catalog, Category};
use crate::model::selection::Selection;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One chip of the toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarChip {
    pub category: Category,
    pub count: usize,
    /// Labels of the selected keys
    pub labels: Vec<String>,
}

/// Toolbar opening the category dialogs
#[derive(Debug, Default)]
pub struct FilterToolbar {
    pub chips: Vec<ToolbarChip>,
}

impl FilterToolbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh badges from the committed selection
    pub fn sync(&mut self, selection: &Selection, catalog: &Catalog) {
        self.chips = Category::all()
            .into_iter()
            .map(|category| {
                let entries = selection.selected_chips(catalog, category);
                ToolbarChip {
                    category,
                    count: entries.len(),
                    labels: entries.iter().map(|e| e.label.to_string()).collect(),
                }
            })
            .collect();
    }

    fn shortcut(category: Category) -> char {
        match category {
            Category::Dimensions => 'd',
            Category::Metrics => 'm',
            Category::Filters => 'f',
        }
    }
}

impl Component for FilterToolbar {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Char('d') => Some(Action::OpenCategory(Category::Dimensions)),
            KeyCode::Char('m') => Some(Action::OpenCategory(Category::Metrics)),
            KeyCode::Char('f') => Some(Action::OpenCategory(Category::Filters)),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (chip, chip_area) in self.chips.iter().zip(areas.iter()) {
            let active = chip.count > 0;
            let border = if active { Color::Cyan } else { Color::DarkGray };

            let summary = if chip.labels.is_empty() {
                Span::styled("None", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(chip.labels.join(", "), Style::default().fg(Color::White))
            };

            let title = Line::from(vec![
                Span::styled(
                    format!(" {} ", Self::shortcut(chip.category)),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ", chip.category.label()),
                    Style::default().fg(border).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("({}) ", chip.count),
                    Style::default().fg(if active { Color::Green } else { Color::DarkGray }),
                ),
            ]);

            let paragraph = Paragraph::new(Line::from(vec![Span::raw(" "), summary])).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(title),
            );
            frame.render_widget(paragraph, *chip_area);
        }
        Ok(())
    }
}
