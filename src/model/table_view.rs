//! Table view model
//!
//! Derives the rows the listing table renders from the full dataset: sort
//! first, then slice the requested page.

use super::catalog::ColumnConfig;
use super::criteria::{Criteria, SortDirection};
use super::row::{Cell, Row};
use super::selection::Selection;
use std::cmp::Ordering;

/// Derived pagination numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total_page_count: usize,
    pub total_items: usize,
}

/// What the listing table renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub rows: Vec<Row>,
    /// Criteria with pagination annotated by [`PaginationMeta`]
    pub criteria: Criteria,
}

impl TableView {
    pub fn meta(&self) -> Option<PaginationMeta> {
        let pagination = self.criteria.pagination.as_ref()?;
        Some(PaginationMeta {
            total_page_count: pagination.total_page_count?,
            total_items: pagination.total_items?,
        })
    }
}

/// Missing and null cells first, then numbers, then everything else
fn cell_rank(cell: Option<&Cell>) -> u8 {
    match cell {
        None | Some(Cell::Null) => 0,
        Some(Cell::Number(_)) => 1,
        Some(_) => 2,
    }
}

fn compare_cells(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    cell_rank(a).cmp(&cell_rank(b)).then_with(|| {
        match (a.and_then(Cell::as_number), b.and_then(Cell::as_number)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => {
                let x = a.map(Cell::sort_key).unwrap_or_default();
                let y = b.map(Cell::sort_key).unwrap_or_default();
                x.cmp(&y)
            }
        }
    })
}

/// Stable sort by one column
///
/// Missing and null cells come first, then numbers compared numerically,
/// then everything else as lowercased text. Text compares by code point
/// with no locale collation, so accented letters order after `z`. Without a
/// column the input order is kept.
pub fn sort_rows<'a>(rows: &'a [Row], sort_by: Option<&str>, sort_as: SortDirection) -> Vec<&'a Row> {
    let mut sorted: Vec<&Row> = rows.iter().collect();
    let Some(column) = sort_by else {
        return sorted;
    };

    sorted.sort_by(|a, b| {
        let ordering = compare_cells(a.get(column), b.get(column));
        match sort_as {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Slice one 1-based page
///
/// Pages past the end (and page 0) are empty.
pub fn paginate<T>(rows: &[T], page_index: usize, page_size: usize) -> &[T] {
    let Some(start) = page_index
        .checked_sub(1)
        .and_then(|i| i.checked_mul(page_size))
    else {
        return &[];
    };
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// Page count and item count, `None` for a zero page size
pub fn pagination_meta(total_rows: usize, page_size: usize) -> Option<PaginationMeta> {
    if page_size == 0 {
        return None;
    }
    Some(PaginationMeta {
        total_page_count: total_rows.div_ceil(page_size),
        total_items: total_rows,
    })
}

/// Sort the full dataset by the criteria, then cut the current page
///
/// Without pagination config (or with a zero page size) all sorted rows are
/// returned and no metadata is added.
pub fn derive_view(rows: &[Row], criteria: &Criteria) -> TableView {
    let sorted = sort_rows(rows, criteria.sort_by(), criteria.sort_as());
    let mut annotated = criteria.clone();

    let page = match criteria.pagination.as_ref() {
        Some(pagination) => match pagination_meta(sorted.len(), pagination.page_size) {
            Some(meta) => {
                let mut pagination = pagination.config();
                pagination.total_page_count = Some(meta.total_page_count);
                pagination.total_items = Some(meta.total_items);
                let slice = paginate(&sorted, pagination.page_index, pagination.page_size);
                annotated.pagination = Some(pagination);
                slice.to_vec()
            }
            None => sorted,
        },
        None => sorted,
    };

    TableView {
        rows: page.into_iter().cloned().collect(),
        criteria: annotated,
    }
}

/// Configured columns whose id is a selected dimension or metric
pub fn visible_columns<'a>(columns: &'a [ColumnConfig], selection: &Selection) -> Vec<&'a ColumnConfig> {
    columns
        .iter()
        .filter(|c| selection.dimensions.contains(&c.id) || selection.metrics.contains(&c.id))
        .collect()
}
