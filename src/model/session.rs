//! Report session - criteria plus the draft edited in a category dialog
//!
//! `Idle` → `Editing(category)` when a dialog opens. Apply commits the draft
//! into the criteria and goes back to `Idle`; cancel drops the draft and keeps
//! whatever was committed before.

use super::catalog::Category;
use super::criteria::Criteria;
use super::reducer::{self, TableUpdate};
use super::selection::Selection;

/// Sink for committed criteria changes
pub trait CriteriaListener {
    fn on_criteria_change(&mut self, criteria: &Criteria);
}

impl<F> CriteriaListener for F
where
    F: FnMut(&Criteria),
{
    fn on_criteria_change(&mut self, criteria: &Criteria) {
        self(criteria)
    }
}

/// Dialog state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing(Category),
}

/// Criteria and selection state of one report instance
#[derive(Debug, Clone)]
pub struct ReportSession {
    criteria: Criteria,
    /// Last committed selection
    selection: Selection,
    /// Uncommitted edits while a dialog is open
    draft: Option<(Category, Selection)>,
}

impl ReportSession {
    pub fn new(criteria: Criteria) -> Self {
        let selection = Selection::from_criteria(&criteria);
        Self {
            criteria,
            selection,
            draft: None,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Committed selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> SessionState {
        match &self.draft {
            Some((category, _)) => SessionState::Editing(*category),
            None => SessionState::Idle,
        }
    }

    /// Selection shown in the open dialog, or the committed one when idle
    pub fn current_selection(&self) -> &Selection {
        self.draft
            .as_ref()
            .map(|(_, draft)| draft)
            .unwrap_or(&self.selection)
    }

    pub fn draft_mut(&mut self) -> Option<&mut Selection> {
        self.draft.as_mut().map(|(_, draft)| draft)
    }

    /// Open a category dialog with a draft copied from the committed state
    ///
    /// Opening another category while editing keeps the current draft.
    pub fn open_category(&mut self, category: Category) {
        match self.draft.as_mut() {
            Some((open, _)) => *open = category,
            None => self.draft = Some((category, self.selection.clone())),
        }
    }

    /// Commit the draft and return the new criteria
    ///
    /// Returns `None` when no dialog is open.
    pub fn apply(&mut self) -> Option<&Criteria> {
        let (_, draft) = self.draft.take()?;
        self.criteria = reducer::apply(&self.criteria, &draft);
        self.selection = draft;
        Some(&self.criteria)
    }

    /// Drop the draft
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Merge a table update, returning the new criteria when it was recognized
    pub fn apply_table_update(&mut self, update: &TableUpdate) -> Option<&Criteria> {
        if !update.is_pagination() && !update.is_sort() {
            return None;
        }
        self.criteria = reducer::apply_table_update(&self.criteria, update);
        Some(&self.criteria)
    }
}
