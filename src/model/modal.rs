//! Modal stack for the report's overlays
//!
//! Dialogs stack: the date-range picker opens on top of the filters dialog
//! and closing it returns to the dialog underneath.

use super::catalog::Category;

/// A modal overlay drawn on top of the report
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Selection dialog for one toolbar category
    Category { category: Category },
    /// Date-range picker for a configured date filter
    DateRangePicker { filter_id: String },
    /// Keyboard shortcuts
    Help,
    /// Quit confirmation
    QuitConfirm,
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    /// Create a new empty modal stack
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a modal onto the stack
    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    /// Pop the top modal from the stack
    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    /// Get a reference to the top modal without removing it
    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    /// Modals from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Remove every modal
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Drop modals until a category dialog is on top (or the stack is empty)
    pub fn pop_to_category(&mut self) {
        while let Some(top) = self.stack.last() {
            if matches!(top, Modal::Category { .. }) {
                break;
            }
            self.stack.pop();
        }
    }
}
