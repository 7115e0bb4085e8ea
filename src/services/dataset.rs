//! Dataset loading and host-side filtering
//!
//! The widgets never filter data themselves; this is the host side of the
//! contract, used by the bundled binary to re-derive its rows whenever the
//! criteria change.

use crate::model::catalog::{Catalog, FilterKind};
use crate::model::criteria::{Criteria, FilterValue};
use crate::model::row::{Cell, Row};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// Load rows from a `.csv` or `.json` file
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match extension(path).as_deref() {
        Some("csv") => rows_from_csv(&contents),
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display())),
        _ => bail!(
            "Unsupported data file {} (expected .csv or .json)",
            path.display()
        ),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Parse CSV text with a header row, inferring cell types
pub fn rows_from_csv(contents: &str) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), Cell::infer(v)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Keep the rows matching every active filter
///
/// A text filter matches the column named after the filter id, or any cell
/// when no such column exists; empty text matches everything. A date filter
/// reads `YYYY-MM-DD` (optionally followed by a time) from the column named
/// after the filter id. Filters unknown to the catalog are ignored.
pub fn host_filter(rows: &[Row], criteria: &Criteria, catalog: &Catalog) -> Vec<Row> {
    rows.iter()
        .filter(|row| {
            criteria.filters.iter().all(|(id, value)| {
                let Some(item) = catalog.filter(id) else {
                    return true;
                };
                match (item.kind, value) {
                    (FilterKind::TextInput, FilterValue::Text(text)) => text_matches(row, id, text),
                    (FilterKind::DateRange, FilterValue::DateRange(range)) => {
                        if range.start_date.is_none() && range.end_date.is_none() {
                            return true;
                        }
                        row.get(id)
                            .and_then(parse_day)
                            .is_some_and(|day| range.contains(day))
                    }
                    // Placeholder value of a freshly toggled filter
                    _ => true,
                }
            })
        })
        .cloned()
        .collect()
}

fn text_matches(row: &Row, id: &str, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    match row.get(id) {
        Some(cell) => cell.sort_key().contains(&needle),
        None => row.values().any(|cell| cell.sort_key().contains(&needle)),
    }
}

fn parse_day(cell: &Cell) -> Option<NaiveDate> {
    let Cell::Text(text) = cell else {
        return None;
    };
    let day = text.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
