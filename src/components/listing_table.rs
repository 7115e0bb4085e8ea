//! Listing table - one page of report rows with sort and pagination
//!
//! Renders the rows of a [`TableView`] under the visible columns. Page and
//! sort keys are turned into Actions; the App folds them into the criteria
//! and hands back a freshly derived view.

use crate::action::Action;
use crate::component::Component;
use crate::model::catalog::ColumnConfig;
use crate::model::criteria::{SortDirection, PAGE_SIZE_OPTIONS};
use crate::model::row::Row;
use crate::model::table_view::{PaginationMeta, TableView};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shown instead of rows when the page is empty
pub const EMPTY_MESSAGE: &str = "No Data To Show";

/// Rendered for missing and null cells
pub const MISSING_CELL: &str = "-";

const MAX_COLUMN_WIDTH: usize = 30;
const COLUMN_SEPARATOR: &str = " │ ";

/// Text of one cell under a column
pub fn cell_text(row: &Row, column: &ColumnConfig) -> String {
    match row.get(column.accessor()) {
        Some(cell) if !cell.is_null() => cell.to_string(),
        _ => MISSING_CELL.to_string(),
    }
}

/// Truncate to a display width, marking cut text with `…`, then pad
pub fn fit_width(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    let room = width.saturating_sub(1);
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > room {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Neighbouring rows-per-page option
///
/// Sizes outside the fixed options snap to the closest option in the
/// requested direction.
pub fn step_page_size(current: usize, up: bool) -> usize {
    if up {
        PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|size| *size > current)
            .unwrap_or(PAGE_SIZE_OPTIONS[PAGE_SIZE_OPTIONS.len() - 1])
    } else {
        PAGE_SIZE_OPTIONS
            .iter()
            .rev()
            .copied()
            .find(|size| *size < current)
            .unwrap_or(PAGE_SIZE_OPTIONS[0])
    }
}

/// Paginated report table
#[derive(Debug, Default)]
pub struct ListingTable {
    pub columns: Vec<ColumnConfig>,
    pub rows: Vec<Row>,
    pub sort_by: Option<String>,
    pub sort_as: SortDirection,
    pub page_index: usize,
    pub page_size: usize,
    pub meta: Option<PaginationMeta>,
    pub paginated: bool,
}

impl ListingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a derived view under the given columns
    pub fn set_view(&mut self, columns: Vec<ColumnConfig>, view: &TableView) {
        self.columns = columns;
        self.rows = view.rows.clone();
        self.sort_by = view.criteria.sort_by().map(String::from);
        self.sort_as = view.criteria.sort_as();
        self.meta = view.meta();
        match &view.criteria.pagination {
            Some(p) => {
                self.paginated = true;
                self.page_index = p.page_index;
                self.page_size = p.page_size;
            }
            None => {
                self.paginated = false;
                self.page_index = 1;
                self.page_size = 0;
            }
        }
    }

    pub fn total_pages(&self) -> usize {
        self.meta.map(|m| m.total_page_count).unwrap_or(1)
    }

    pub fn has_next_page(&self) -> bool {
        self.paginated && self.page_index < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.paginated && self.page_index > 1
    }

    /// The sortable column after the current sort column, wrapping around
    pub fn next_sort_column(&self) -> Option<String> {
        let sortable: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.accessor())
            .collect();
        if sortable.is_empty() {
            return None;
        }
        let next = match self
            .sort_by
            .as_deref()
            .and_then(|current| sortable.iter().position(|s| *s == current))
        {
            Some(idx) => sortable[(idx + 1) % sortable.len()],
            None => sortable[0],
        };
        Some(next.to_string())
    }

    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|column| {
                if let Some(width) = column.width {
                    return width as usize;
                }
                // Room for the sort arrow
                let header = column.label.width() + if column.sortable { 2 } else { 0 };
                self.rows
                    .iter()
                    .map(|row| cell_text(row, column).width())
                    .fold(header, usize::max)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    fn header_label(&self, column: &ColumnConfig) -> String {
        if !column.sortable {
            return column.label.clone();
        }
        match self.sort_by.as_deref() {
            Some(current) if current == column.accessor() => {
                format!("{} {}", column.label, self.sort_as.arrow())
            }
            _ => column.label.clone(),
        }
    }

    /// Header, separator and one line per row
    pub fn build_table_lines(&self) -> Vec<Line<'static>> {
        let widths = self.column_widths();
        let mut lines = Vec::new();

        let header_spans: Vec<Span> = self
            .columns
            .iter()
            .zip(&widths)
            .flat_map(|(column, width)| {
                let color = if column.sortable {
                    Color::Cyan
                } else {
                    Color::Gray
                };
                vec![
                    Span::styled(
                        fit_width(&self.header_label(column), *width),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(COLUMN_SEPARATOR),
                ]
            })
            .collect();
        lines.push(Line::from(header_spans));

        let separator: String = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )));

        for row in &self.rows {
            let row_spans: Vec<Span> = self
                .columns
                .iter()
                .zip(&widths)
                .flat_map(|(column, width)| {
                    let text = cell_text(row, column);
                    let color = if text == MISSING_CELL {
                        Color::DarkGray
                    } else {
                        Color::White
                    };
                    vec![
                        Span::styled(fit_width(&text, *width), Style::default().fg(color)),
                        Span::raw(COLUMN_SEPARATOR),
                    ]
                })
                .collect();
            lines.push(Line::from(row_spans));
        }

        lines
    }

    /// Rows-per-page and page indicator
    pub fn footer_line(&self) -> Line<'static> {
        if !self.paginated {
            return Line::from(Span::styled(
                format!("{} rows", self.rows.len()),
                Style::default().fg(Color::Yellow),
            ));
        }

        let total_items = self.meta.map(|m| m.total_items).unwrap_or(0);
        let arrow_style = |enabled: bool| {
            if enabled {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        Line::from(vec![
            Span::styled("Rows per page: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.page_size.to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("   "),
            Span::styled("◀ ", arrow_style(self.has_prev_page())),
            Span::styled(
                format!("Page {} of {}", self.page_index, self.total_pages().max(1)),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(" ▶", arrow_style(self.has_next_page())),
            Span::raw("   "),
            Span::styled(
                format!("{} items", total_items),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl Component for ListingTable {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') if self.has_next_page() => {
                Some(Action::NextPage)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') if self.has_prev_page() => {
                Some(Action::PrevPage)
            }
            KeyCode::Char('s') => self.next_sort_column().map(Action::SortColumn),
            KeyCode::Char('r') if self.sort_by.is_some() => Some(Action::ReverseSort),
            KeyCode::Char('+') | KeyCode::Char('=') if self.paginated => Some(Action::PageSizeUp),
            KeyCode::Char('-') if self.paginated => Some(Action::PageSizeDown),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Results ")
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        if self.columns.is_empty() || self.rows.is_empty() {
            let mut lines = Vec::new();
            if !self.columns.is_empty() {
                lines.extend(self.build_table_lines());
            }
            lines.push(Line::from(""));
            lines.push(
                Line::from(Span::styled(
                    EMPTY_MESSAGE,
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center),
            );
            if self.columns.is_empty() {
                lines.push(
                    Line::from(Span::styled(
                        "Press d or m to choose columns",
                        Style::default().fg(Color::DarkGray),
                    ))
                    .alignment(Alignment::Center),
                );
            }
            frame.render_widget(Paragraph::new(lines), chunks[0]);
        } else {
            frame.render_widget(Paragraph::new(self.build_table_lines()), chunks[0]);
        }

        frame.render_widget(
            Paragraph::new(self.footer_line()).alignment(Alignment::Center),
            chunks[1],
        );
        Ok(())
    }
}
