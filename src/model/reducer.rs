//! Criteria reducer
//!
//! Pure functions that take the previous criteria and an action value and
//! return the next criteria. The caller owns storing the result and
//! notifying the host.

use super::criteria::{Criteria, Pagination, Sort, SortDirection, DEFAULT_PAGE_SIZE};
use super::selection::Selection;
use serde::{Deserialize, Serialize};

/// Update emitted by the listing table
///
/// An update carrying a page key is a pagination update, otherwise one
/// carrying a sort key is a sort update. Anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableUpdate {
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_as: Option<SortDirection>,
}

impl TableUpdate {
    /// Jump to a page
    pub fn page(page_index: usize) -> Self {
        Self {
            page_index: Some(page_index),
            ..Default::default()
        }
    }

    /// Change rows per page, going back to the first page
    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_index: Some(1),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Sort by a column, flipping the current direction
    pub fn sort_toggle(column: &str, current: SortDirection) -> Self {
        Self {
            sort_by: Some(column.to_string()),
            sort_as: Some(current.toggled()),
            ..Default::default()
        }
    }

    pub fn is_pagination(&self) -> bool {
        self.page_index.is_some() || self.page_size.is_some()
    }

    pub fn is_sort(&self) -> bool {
        self.sort_by.is_some() || self.sort_as.is_some()
    }
}

/// Whether two filter maps differ by value
pub fn filters_changed(previous: &Criteria, next: &Criteria) -> bool {
    previous.filters != next.filters
}

/// Finalize a criteria transition
///
/// When the filters changed, the page index goes back to 1 so a narrowed
/// result never lands on an empty page. Only `filters` take part in the
/// comparison.
pub fn commit(previous: &Criteria, mut next: Criteria) -> Criteria {
    if filters_changed(previous, &next) {
        if let Some(pagination) = next.pagination.as_mut() {
            pagination.page_index = 1;
        }
    }
    next
}

/// Merge a confirmed selection into the criteria
///
/// `dimensions`, `metrics` and `filters` are replaced wholesale; every other
/// key is left as it was.
pub fn apply(criteria: &Criteria, selection: &Selection) -> Criteria {
    let next = Criteria {
        dimensions: selection.dimensions.clone(),
        metrics: selection.metrics.clone(),
        filters: selection.filters.clone(),
        ..criteria.clone()
    };
    commit(criteria, next)
}

/// Merge a table update into pagination or sort
///
/// Unrecognized updates return the criteria unchanged.
pub fn apply_table_update(criteria: &Criteria, update: &TableUpdate) -> Criteria {
    let mut next = criteria.clone();

    if update.is_pagination() {
        let base = criteria
            .pagination
            .as_ref()
            .map(Pagination::config)
            .unwrap_or_else(|| Pagination::new(1, DEFAULT_PAGE_SIZE));
        next.pagination = Some(Pagination::new(
            update.page_index.unwrap_or(base.page_index),
            update.page_size.unwrap_or(base.page_size),
        ));
    } else if update.is_sort() {
        let base = criteria.sort.clone().unwrap_or_default();
        next.sort = Some(Sort {
            sort_by: update.sort_by.clone().or(base.sort_by),
            sort_as: update.sort_as.unwrap_or(base.sort_as),
        });
    } else {
        return next;
    }

    commit(criteria, next)
}
