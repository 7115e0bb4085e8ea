//! Root application component
//!
//! The App owns the report session and the dataset, routes key events to
//! the widget on top and folds the Actions they emit into the criteria.
//! After every committed change the table view is derived again from the
//! full dataset and the new criteria are pushed to the listener.

use crate::action::Action;
use crate::component::Component;
use crate::components::listing_table::step_page_size;
use crate::components::{
    calculate_report_layout, CategoryDialog, DateRangePicker, ExportButton, FilterToolbar,
    HelpDialog, ListingTable, QuitDialog,
};
use crate::config::ReportDefinition;
use crate::model::catalog::Category;
use crate::model::criteria::{Criteria, FilterValue, SortDirection, DEFAULT_PAGE_SIZE};
use crate::model::modal::{Modal, ModalStack};
use crate::model::reducer::TableUpdate;
use crate::model::row::Row;
use crate::model::selection::Selection;
use crate::model::session::{CriteriaListener, ReportSession, SessionState};
use crate::model::table_view::{derive_view, sort_rows, visible_columns, TableView};
use crate::services::{host_filter, ExportRequest, ExportRunner, ExportSource, ExportStatus};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Catalog, columns and export settings
    pub definition: ReportDefinition,

    /// Criteria, committed selection and dialog draft
    pub session: ReportSession,

    /// Full dataset the view is derived from
    pub rows: Vec<Row>,

    /// Rows and annotated criteria currently shown
    pub view: TableView,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background CSV export
    pub export_runner: ExportRunner,

    /// Where exports are written
    pub export_path: PathBuf,

    /// Day the date presets resolve against
    pub today: NaiveDate,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Host-supplied export callback; exports the filtered rows when unset
    export_source: Option<Arc<dyn ExportSource>>,

    /// Receives every committed criteria change
    listener: Option<Box<dyn CriteriaListener>>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub toolbar: FilterToolbar,
    pub category_dialog: CategoryDialog,
    pub date_picker: DateRangePicker,
    pub table: ListingTable,
    pub export_button: ExportButton,
    pub help_dialog: HelpDialog,
    pub quit_dialog: QuitDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create a report over a dataset
    ///
    /// Criteria without pagination show every matching row.
    pub fn new(definition: ReportDefinition, rows: Vec<Row>) -> App {
        let criteria = definition.criteria.clone();

        let today = Local::now().date_naive();
        let export_path = PathBuf::from(&definition.export.filename);
        let export_button = ExportButton::new(&definition.export.filename);

        let mut app = App {
            definition,
            session: ReportSession::new(criteria),
            rows,
            view: TableView::default(),
            modals: ModalStack::new(),
            export_runner: ExportRunner::new(),
            export_path,
            today,
            should_quit: false,
            export_source: None,
            listener: None,
            toolbar: FilterToolbar::new(),
            category_dialog: CategoryDialog::new(),
            date_picker: DateRangePicker::new(today),
            table: ListingTable::new(),
            export_button,
            help_dialog: HelpDialog::default(),
            quit_dialog: QuitDialog::default(),
        };
        app.refresh_view();
        app
    }

    /// Write exports to `path`
    pub fn with_export_path(mut self, path: PathBuf) -> Self {
        self.export_button.filename = path.display().to_string();
        self.export_path = path;
        self
    }

    /// Fetch exported rows from the host instead of the loaded dataset
    pub fn with_export_source(mut self, source: Arc<dyn ExportSource>) -> Self {
        self.export_source = Some(source);
        self
    }

    /// Register the criteria change sink
    pub fn on_criteria_change(mut self, listener: impl CriteriaListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn criteria(&self) -> &Criteria {
        self.session.criteria()
    }

    /// Derive the table view and widget state from the committed criteria
    pub fn refresh_view(&mut self) {
        let criteria = self.session.criteria();
        let filtered = host_filter(&self.rows, criteria, &self.definition.catalog);
        self.view = derive_view(&filtered, criteria);

        let columns = visible_columns(&self.definition.columns, self.session.selection())
            .into_iter()
            .cloned()
            .collect();
        self.table.set_view(columns, &self.view);
        self.toolbar
            .sync(self.session.selection(), &self.definition.catalog);
    }

    /// Every matching row in table order, ignoring pagination
    pub fn exportable_rows(&self) -> Vec<Row> {
        let criteria = self.session.criteria();
        let filtered = host_filter(&self.rows, criteria, &self.definition.catalog);
        sort_rows(&filtered, criteria.sort_by(), criteria.sort_as())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Row keys written to the export file
    pub fn export_headers(&self) -> Vec<String> {
        if !self.definition.export.headers.is_empty() {
            return self.definition.export.headers.clone();
        }
        self.table
            .columns
            .iter()
            .map(|c| c.accessor().to_string())
            .collect()
    }

    fn criteria_changed(&mut self) {
        let criteria = self.session.criteria();
        info!(
            dimensions = ?criteria.dimensions,
            metrics = ?criteria.metrics,
            filters = criteria.filters.len(),
            page = criteria.pagination.as_ref().map(|p| p.page_index),
            sort_by = criteria.sort_by(),
            "criteria changed"
        );
        if let Some(listener) = self.listener.as_mut() {
            listener.on_criteria_change(criteria);
        }
        self.refresh_view();
    }

    fn editing_category(&self) -> Option<Category> {
        match self.session.state() {
            SessionState::Editing(category) => Some(category),
            SessionState::Idle => None,
        }
    }

    /// Edit the draft of the open dialog, then mirror it in the dialog
    fn edit_draft(&mut self, edit: impl FnOnce(&mut Selection, Category)) {
        let Some(category) = self.editing_category() else {
            return;
        };
        if let Some(draft) = self.session.draft_mut() {
            edit(draft, category);
        }
        self.sync_category_dialog();
    }

    fn sync_category_dialog(&mut self) {
        self.category_dialog
            .sync(self.session.current_selection(), &self.definition.catalog);
    }

    fn table_update(&mut self, update: TableUpdate) {
        debug!(?update, "table update");
        if self.session.apply_table_update(&update).is_some() {
            self.criteria_changed();
        }
    }

    fn open_category(&mut self, category: Category) {
        debug!(%category, "opening category dialog");
        self.session.open_category(category);
        self.category_dialog.open(category);
        self.sync_category_dialog();
        self.modals.push(Modal::Category { category });
    }

    fn open_date_picker(&mut self, id: &str) {
        let Some(filter) = self.definition.catalog.filter(id) else {
            warn!(id, "date picker requested for unknown filter");
            return;
        };
        let current = self
            .session
            .current_selection()
            .filters
            .get(id)
            .and_then(FilterValue::as_date_range);
        self.date_picker
            .open(id, &filter.label, current, self.today);
        self.modals.push(Modal::DateRangePicker {
            filter_id: id.to_string(),
        });
    }

    fn close_dialogs(&mut self) {
        self.modals.clear();
    }

    fn start_export(&mut self) {
        if self.export_runner.is_running() {
            return;
        }

        let source: Arc<dyn ExportSource> = match &self.export_source {
            Some(source) => Arc::clone(source),
            None => {
                let rows = self.exportable_rows();
                Arc::new(move || -> Result<Vec<Row>> { Ok(rows.clone()) })
            }
        };
        let request = ExportRequest {
            path: self.export_path.clone(),
            headers: self.export_headers(),
        };

        info!(path = %request.path.display(), columns = request.headers.len(), "export requested");
        if self.export_runner.spawn(source, request) {
            self.export_button.set_status(ExportStatus::Running);
        }
    }

    fn poll_export(&mut self) {
        if let Some(status) = self.export_runner.poll() {
            match &status {
                ExportStatus::Finished { path, rows } => {
                    info!(rows, path = %path.display(), "export written")
                }
                ExportStatus::Failed(err) => warn!(error = %err, "export failed"),
                _ => {}
            }
            self.export_button.set_status(status);
        }
    }

    fn current_page_size(&self) -> usize {
        self.session
            .criteria()
            .pagination
            .as_ref()
            .map(|p| p.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        if let Some(action) = self.toolbar.handle_key_event(key)? {
            return Ok(Some(action));
        }
        if let Some(action) = self.table.handle_key_event(key)? {
            return Ok(Some(action));
        }
        if let Some(action) = self.export_button.handle_key_event(key)? {
            return Ok(Some(action));
        }

        let action = match key.code {
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::OpenQuitDialog),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            debug!(%action, "update");
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.poll_export();
                self.export_button.update(Action::Tick)?;
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.export_running = self.export_runner.is_running();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                if let Some(Modal::Category { .. }) = self.modals.pop() {
                    self.session.cancel();
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Category Dialog
            // ─────────────────────────────────────────────────────────────────
            Action::OpenCategory(category) => self.open_category(category),
            Action::ToggleItem(key) => {
                self.edit_draft(|draft, category| draft.toggle(category, &key));
            }
            Action::DeleteChip(key) => {
                self.edit_draft(|draft, category| {
                    draft.delete(category, &key);
                });
            }
            Action::ClearCategory => {
                self.edit_draft(|draft, category| draft.clear_category(category));
            }
            Action::SetFilterText { id, text } => {
                self.edit_draft(|draft, _| {
                    draft.set_filter_value(&id, FilterValue::Text(text));
                });
            }
            Action::ApplySelection => {
                self.close_dialogs();
                if self.session.apply().is_some() {
                    self.criteria_changed();
                }
            }
            Action::CancelSelection => {
                debug!("selection cancelled");
                self.session.cancel();
                self.close_dialogs();
            }

            // ─────────────────────────────────────────────────────────────────
            // Date Range Picker
            // ─────────────────────────────────────────────────────────────────
            Action::OpenDateRangePicker(id) => self.open_date_picker(&id),
            Action::SetDateRange { id, range } => {
                self.edit_draft(|draft, _| {
                    draft.set_filter_value(&id, FilterValue::DateRange(range));
                });
                self.modals.pop_to_category();
            }

            // ─────────────────────────────────────────────────────────────────
            // Listing Table
            // ─────────────────────────────────────────────────────────────────
            Action::NextPage => {
                if self.table.has_next_page() {
                    self.table_update(TableUpdate::page(self.table.page_index + 1));
                }
            }
            Action::PrevPage => {
                if self.table.has_prev_page() {
                    self.table_update(TableUpdate::page(self.table.page_index - 1));
                }
            }
            Action::SortColumn(column) => {
                let criteria = self.session.criteria();
                // A new column starts ascending
                let current = if criteria.sort_by() == Some(column.as_str()) {
                    criteria.sort_as()
                } else {
                    SortDirection::Desc
                };
                self.table_update(TableUpdate::sort_toggle(&column, current));
            }
            Action::ReverseSort => {
                let criteria = self.session.criteria();
                if let Some(column) = criteria.sort_by().map(String::from) {
                    let current = criteria.sort_as();
                    self.table_update(TableUpdate::sort_toggle(&column, current));
                }
            }
            Action::PageSizeUp | Action::PageSizeDown if self.table.paginated => {
                let current = self.current_page_size();
                let next = step_page_size(current, action == Action::PageSizeUp);
                if next != current {
                    self.table_update(TableUpdate::page_size(next));
                }
            }
            Action::PageSizeUp | Action::PageSizeDown => {}

            // ─────────────────────────────────────────────────────────────────
            // Export
            // ─────────────────────────────────────────────────────────────────
            Action::Export => self.start_export(),
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_report_layout(area);
        let matching = self
            .view
            .meta()
            .map(|m| m.total_items)
            .unwrap_or(self.view.rows.len());

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", self.definition.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} of {} rows match", matching, self.rows.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(title, layout.title);

        self.toolbar.draw(frame, layout.toolbar)?;
        self.table.draw(frame, layout.table)?;
        self.export_button.draw(frame, layout.status)?;

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" d/m/f ", Style::default().fg(Color::Yellow)),
            Span::raw("Choose  "),
            Span::styled(" ←/→ ", Style::default().fg(Color::Cyan)),
            Span::raw("Page  "),
            Span::styled(" s/r ", Style::default().fg(Color::Cyan)),
            Span::raw("Sort  "),
            Span::styled(" +/- ", Style::default().fg(Color::Cyan)),
            Span::raw("Rows  "),
            Span::styled(" e ", Style::default().fg(Color::Green)),
            Span::raw("Export  "),
            Span::styled(" ? ", Style::default().fg(Color::Yellow)),
            Span::raw("Help  "),
            Span::styled(" q ", Style::default().fg(Color::Red)),
            Span::raw("Quit"),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, layout.help);

        let modals: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &modals {
            self.draw_modal(frame, area, modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::Category { .. } => self.category_dialog.handle_key_event(key),
            Modal::DateRangePicker { .. } => self.date_picker.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::Category { .. } => {
                self.sync_category_dialog();
                self.category_dialog.draw(frame, area)?;
            }
            Modal::DateRangePicker { .. } => self.date_picker.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::criteria::Pagination;
    use crate::model::catalog::{Catalog, CatalogItem, ColumnConfig, FilterItem, FilterKind};
    use crate::model::date_range::DateRange;
    use crate::model::row::{row, Cell};
    use ratatui::{backend::TestBackend, Terminal};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn definition() -> ReportDefinition {
        ReportDefinition {
            title: "Sales".to_string(),
            catalog: Catalog {
                dimensions: vec![CatalogItem {
                    value: "region".to_string(),
                    label: "Region".to_string(),
                }],
                metrics: vec![CatalogItem {
                    value: "amount".to_string(),
                    label: "Amount".to_string(),
                }],
                filters: vec![
                    FilterItem {
                        id: "q".to_string(),
                        label: "Search".to_string(),
                        kind: FilterKind::TextInput,
                    },
                    FilterItem {
                        id: "created".to_string(),
                        label: "Created".to_string(),
                        kind: FilterKind::DateRange,
                    },
                ],
            },
            columns: vec![
                ColumnConfig::new("region", "Region").sortable(),
                ColumnConfig::new("amount", "Amount").sortable(),
            ],
            criteria: Criteria::default().with_pagination(1, DEFAULT_PAGE_SIZE),
            ..Default::default()
        }
    }

    fn rows() -> Vec<Row> {
        (1..=12)
            .map(|i| {
                let region = if i % 2 == 0 { "east" } else { "west" };
                row([
                    ("region", Cell::from(region)),
                    ("amount", Cell::from(i as i64)),
                    ("created", Cell::from(format!("2024-01-{:02}", i))),
                ])
            })
            .collect()
    }

    fn app() -> App {
        App::new(definition(), rows())
    }

    fn run(app: &mut App, action: Action) {
        let mut next = Some(action);
        while let Some(a) = next {
            next = app.update(a).unwrap();
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        if let Some(action) = app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
        {
            run(app, action);
        }
    }

    #[test]
    fn test_new_keeps_host_pagination() {
        let app = app();
        assert_eq!(app.criteria().pagination, Some(Pagination::new(1, DEFAULT_PAGE_SIZE)));
        assert_eq!(app.view.rows.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(app.view.meta().unwrap().total_items, 12);
        // Nothing selected, so no visible columns
        assert!(app.table.columns.is_empty());
    }

    #[test]
    fn test_without_pagination_shows_every_row() {
        let definition = ReportDefinition {
            criteria: Criteria::default(),
            ..definition()
        };
        let seen: Rc<RefCell<Vec<Criteria>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut app = App::new(definition, rows())
            .on_criteria_change(move |c: &Criteria| sink.borrow_mut().push(c.clone()));

        assert!(app.criteria().pagination.is_none());
        assert_eq!(app.view.rows.len(), 12);
        assert!(app.view.meta().is_none());
        assert!(!app.table.paginated);

        // Page keys do nothing, sorting still reports no pagination
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('+'));
        assert!(seen.borrow().is_empty());
        run(&mut app, Action::SortColumn("amount".to_string()));
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].pagination.is_none());
        assert_eq!(app.view.rows.len(), 12);
    }

    #[test]
    fn test_apply_commits_and_notifies() {
        let seen: Rc<RefCell<Vec<Criteria>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut app = app().on_criteria_change(move |c: &Criteria| sink.borrow_mut().push(c.clone()));

        run(&mut app, Action::OpenCategory(Category::Dimensions));
        assert_eq!(app.session.state(), SessionState::Editing(Category::Dimensions));
        run(&mut app, Action::ToggleItem("region".to_string()));
        assert!(seen.borrow().is_empty());

        run(&mut app, Action::ApplySelection);
        assert!(app.modals.is_empty());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].dimensions, vec!["region"]);
        assert_eq!(app.table.columns.len(), 1);
        assert_eq!(app.toolbar.chips[0].count, 1);
    }

    #[test]
    fn test_escape_cancels_draft() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        assert!(matches!(app.modals.top(), Some(Modal::Category { .. })));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.current_selection().metrics, vec!["amount"]);

        press(&mut app, KeyCode::Esc);
        assert!(app.modals.is_empty());
        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(app.criteria().metrics.is_empty());
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut app = app();
        run(&mut app, Action::NextPage);
        run(&mut app, Action::NextPage);
        assert_eq!(app.criteria().pagination.as_ref().unwrap().page_index, 3);
        assert_eq!(app.view.rows.len(), 2);

        run(&mut app, Action::OpenCategory(Category::Filters));
        run(&mut app, Action::ToggleItem("q".to_string()));
        run(
            &mut app,
            Action::SetFilterText {
                id: "q".to_string(),
                text: "east".to_string(),
            },
        );
        run(&mut app, Action::ApplySelection);

        let pagination = app.criteria().pagination.clone().unwrap();
        assert_eq!(pagination.page_index, 1);
        assert_eq!(app.view.meta().unwrap().total_items, 6);
    }

    #[test]
    fn test_date_picker_returns_to_filters_dialog() {
        let mut app = app();
        run(&mut app, Action::OpenCategory(Category::Filters));
        run(&mut app, Action::ToggleItem("created".to_string()));
        run(&mut app, Action::OpenDateRangePicker("created".to_string()));
        assert!(matches!(app.modals.top(), Some(Modal::DateRangePicker { .. })));

        let range = DateRange::custom(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        );
        run(
            &mut app,
            Action::SetDateRange {
                id: "created".to_string(),
                range: range.clone(),
            },
        );
        assert!(matches!(app.modals.top(), Some(Modal::Category { .. })));
        assert_eq!(app.category_dialog.inputs.len(), 1);

        run(&mut app, Action::ApplySelection);
        assert_eq!(app.criteria().filters["created"], FilterValue::DateRange(range));
        assert_eq!(app.view.meta().unwrap().total_items, 4);
    }

    #[test]
    fn test_sort_and_page_size() {
        let mut app = app();
        run(&mut app, Action::SortColumn("amount".to_string()));
        assert_eq!(app.criteria().sort_as(), SortDirection::Asc);
        assert_eq!(app.view.rows[0]["amount"], Cell::Number(1.0));

        run(&mut app, Action::ReverseSort);
        assert_eq!(app.criteria().sort_as(), SortDirection::Desc);
        assert_eq!(app.view.rows[0]["amount"], Cell::Number(12.0));

        run(&mut app, Action::NextPage);
        run(&mut app, Action::PageSizeUp);
        let pagination = app.criteria().pagination.clone().unwrap();
        assert_eq!((pagination.page_index, pagination.page_size), (1, 10));
        assert_eq!(app.view.rows.len(), 10);
    }

    #[test]
    fn test_export_writes_filtered_rows() {
        let path = std::env::temp_dir().join(format!("report-tui-app-{}.csv", std::process::id()));
        let mut app = app().with_export_path(path.clone());
        run(&mut app, Action::OpenCategory(Category::Dimensions));
        run(&mut app, Action::ToggleItem("region".to_string()));
        run(&mut app, Action::ApplySelection);
        run(&mut app, Action::SortColumn("amount".to_string()));

        run(&mut app, Action::Export);
        assert_eq!(app.export_button.status, ExportStatus::Running);
        for _ in 0..500 {
            run(&mut app, Action::Tick);
            if !app.export_runner.is_running() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert_eq!(
            app.export_button.status,
            ExportStatus::Finished {
                path: path.clone(),
                rows: 12
            }
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Region"));
        assert_eq!(lines.next(), Some("west"));
        assert_eq!(contents.lines().count(), 13);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_export_leaves_criteria_alone() {
        let source: Arc<dyn ExportSource> =
            Arc::new(|| -> Result<Vec<Row>> { anyhow::bail!("backend unavailable") });
        let mut app = app().with_export_source(source);
        let before = app.criteria().clone();

        run(&mut app, Action::Export);
        for _ in 0..500 {
            run(&mut app, Action::Tick);
            if !app.export_runner.is_running() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(matches!(app.export_button.status, ExportStatus::Failed(_)));
        assert_eq!(app.criteria(), &before);
    }

    #[test]
    fn test_quit_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.modals.is_empty());
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_draw_report_screen() {
        let mut app = app();
        run(&mut app, Action::OpenCategory(Category::Dimensions));
        run(&mut app, Action::ToggleItem("region".to_string()));
        run(&mut app, Action::ApplySelection);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| app.draw(frame, frame.area()).unwrap())
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Sales"));
        assert!(text.contains("12 of 12 rows match"));
        assert!(text.contains("Page 1 of 3"));
        assert!(text.contains("Export CSV"));
    }
}
