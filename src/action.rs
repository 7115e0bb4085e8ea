//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::catalog::Category;
use crate::model::date_range::DateRange;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for background polling
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Category Dialog
    // ─────────────────────────────────────────────────────────────────────────
    /// Open the dialog of a toolbar chip
    OpenCategory(Category),
    /// Check or uncheck a catalog entry in the open dialog
    ToggleItem(String),
    /// Remove a selected chip
    DeleteChip(String),
    /// Empty the open category
    ClearCategory,
    /// Replace the text of a configured filter
    SetFilterText { id: String, text: String },
    /// Commit the draft
    ApplySelection,
    /// Discard the draft
    CancelSelection,

    // ─────────────────────────────────────────────────────────────────────────
    // Date Range Picker
    // ─────────────────────────────────────────────────────────────────────────
    /// Open the picker for a date filter
    OpenDateRangePicker(String),
    /// Store a picked range on a date filter
    SetDateRange { id: String, range: DateRange },

    // ─────────────────────────────────────────────────────────────────────────
    // Listing Table
    // ─────────────────────────────────────────────────────────────────────────
    NextPage,
    PrevPage,
    /// Sort by a column, toggling direction when it is already sorted
    SortColumn(String),
    /// Flip the current sort direction
    ReverseSort,
    /// Next larger rows-per-page option
    PageSizeUp,
    /// Next smaller rows-per-page option
    PageSizeDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────
    /// Fetch the exportable rows and write the CSV file
    Export,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::OpenCategory(category) => write!(f, "OpenCategory({})", category),
            Action::ToggleItem(key) => write!(f, "ToggleItem({})", key),
            Action::DeleteChip(key) => write!(f, "DeleteChip({})", key),
            Action::ClearCategory => write!(f, "ClearCategory"),
            Action::SetFilterText { id, text } => write!(f, "SetFilterText({}, {:?})", id, text),
            Action::ApplySelection => write!(f, "ApplySelection"),
            Action::CancelSelection => write!(f, "CancelSelection"),
            Action::OpenDateRangePicker(id) => write!(f, "OpenDateRangePicker({})", id),
            Action::SetDateRange { id, range } => {
                write!(f, "SetDateRange({}, {})", id, range.display())
            }
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::SortColumn(column) => write!(f, "SortColumn({})", column),
            Action::ReverseSort => write!(f, "ReverseSort"),
            Action::PageSizeUp => write!(f, "PageSizeUp"),
            Action::PageSizeDown => write!(f, "PageSizeDown"),
            Action::Export => write!(f, "Export"),
        }
    }
}
