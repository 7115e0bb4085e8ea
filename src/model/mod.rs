//! Model layer - report state without any terminal concerns
//!
//! This module contains all state-related types:
//! - `Catalog` - Host-supplied dimensions, metrics, filters and columns
//! - `Criteria` - Authoritative report state owned by the host
//! - `Selection` - Draft edits made in a category dialog
//! - `reducer` / `table_view` - Pure state transitions and derived table rows
//! - `ReportSession` - Idle/editing state machine around the above
//! - `ModalStack` - Modal overlay management

pub mod catalog;
pub mod criteria;
pub mod date_range;
pub mod modal;
pub mod reducer;
pub mod row;
pub mod selection;
pub mod session;
pub mod table_view;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, CatalogItem, Category, ColumnConfig, FilterItem, FilterKind};
pub use criteria::{
    Criteria, FilterValue, Pagination, Sort, SortDirection, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS,
};
pub use date_range::{DateRange, DateRangePreset};
pub use reducer::TableUpdate;
pub use row::{Cell, Row};
pub use selection::{FilterInput, Selection};
pub use session::{CriteriaListener, ReportSession, SessionState};
pub use table_view::{PaginationMeta, TableView};
