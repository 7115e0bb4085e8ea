//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod category_dialog;
pub mod date_range_picker;
pub mod export_button;
pub mod filter_toolbar;
pub mod help_dialog;
pub mod layout;
pub mod listing_table;
pub mod quit_dialog;

pub use category_dialog::CategoryDialog;
pub use date_range_picker::DateRangePicker;
pub use export_button::ExportButton;
pub use filter_toolbar::FilterToolbar;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_report_layout, centered_popup};
pub use listing_table::ListingTable;
pub use quit_dialog::QuitDialog;
