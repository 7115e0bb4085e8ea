//! Catalog of selectable dimensions, metrics and filters
//!
//! The catalog (`criteriaView` on the host side) is supplied once by the
//! host and never modified by the report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three toolbar categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dimensions,
    Metrics,
    Filters,
}

impl Category {
    pub fn all() -> [Category; 3] {
        [Category::Dimensions, Category::Metrics, Category::Filters]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Dimensions => "Dimensions",
            Category::Metrics => "Metrics",
            Category::Filters => "Filters",
        }
    }

    /// Key used by the host for this category
    pub fn key(&self) -> &'static str {
        match self {
            Category::Dimensions => "dimensions",
            Category::Metrics => "metrics",
            Category::Filters => "filters",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Kind of input a filter is configured with
///
/// Filters without a known `type` can still be selected but get no input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterKind {
    #[serde(rename = "textInput")]
    TextInput,
    #[serde(rename = "daterange")]
    DateRange,
    #[default]
    #[serde(other)]
    Untyped,
}

impl FilterKind {
    pub fn is_untyped(&self) -> bool {
        *self == FilterKind::Untyped
    }
}

/// Dimension or metric entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(alias = "id")]
    pub value: String,
    pub label: String,
}

/// Filter entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterItem {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "FilterKind::is_untyped")]
    pub kind: FilterKind,
}

/// Borrowed view over a catalog entry of any category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub key: &'a str,
    pub label: &'a str,
    /// Only set for filter entries
    pub kind: Option<FilterKind>,
}

/// Host-supplied catalog, keyed by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub dimensions: Vec<CatalogItem>,
    pub metrics: Vec<CatalogItem>,
    pub filters: Vec<FilterItem>,
}

impl Catalog {
    /// All entries of a category, in catalog order
    pub fn entries(&self, category: Category) -> Vec<CatalogEntry<'_>> {
        match category {
            Category::Dimensions => Self::list_entries(&self.dimensions),
            Category::Metrics => Self::list_entries(&self.metrics),
            Category::Filters => self
                .filters
                .iter()
                .map(|f| CatalogEntry {
                    key: &f.id,
                    label: &f.label,
                    kind: Some(f.kind),
                })
                .collect(),
        }
    }

    /// Look up a single entry by key
    pub fn find(&self, category: Category, key: &str) -> Option<CatalogEntry<'_>> {
        self.entries(category).into_iter().find(|e| e.key == key)
    }

    pub fn filter(&self, id: &str) -> Option<&FilterItem> {
        self.filters.iter().find(|f| f.id == id)
    }

    fn list_entries(items: &[CatalogItem]) -> Vec<CatalogEntry<'_>> {
        items
            .iter()
            .map(|i| CatalogEntry {
                key: &i.value,
                label: &i.label,
                kind: None,
            })
            .collect()
    }
}

/// Table column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    pub label: String,
    /// Row key to read the cell from, defaults to `id`
    #[serde(default)]
    pub accessor: Option<String>,
    #[serde(default)]
    pub sortable: bool,
    /// Maximum rendered width in cells
    #[serde(default)]
    pub width: Option<u16>,
}

impl ColumnConfig {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            accessor: None,
            sortable: false,
            width: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn accessor(&self) -> &str {
        self.accessor.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        serde_json::from_str(
            r#"{
                "dimensions": [{"value": "region", "label": "Region"}],
                "metrics": [{"value": "amount", "label": "Amount"}],
                "filters": [
                    {"id": "q", "label": "Search", "type": "textInput"},
                    {"id": "created", "label": "Created", "type": "daterange"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_catalog_deserializes_host_shape() {
        let catalog = sample_catalog();
        assert_eq!(catalog.dimensions[0].value, "region");
        assert_eq!(catalog.filters[0].kind, FilterKind::TextInput);
        assert_eq!(catalog.filters[1].kind, FilterKind::DateRange);
    }

    #[test]
    fn test_lenient_entry_shapes() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "dimensions": [{"id": "region", "label": "Region"}],
                "filters": [
                    {"id": "active", "label": "Active"},
                    {"id": "tier", "label": "Tier", "type": "select"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.dimensions[0].value, "region");
        assert_eq!(catalog.filters[0].kind, FilterKind::Untyped);
        assert_eq!(catalog.filters[1].kind, FilterKind::Untyped);

        let json = serde_json::to_value(&catalog.filters[0]).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_missing_categories_default_to_empty() {
        let catalog: Catalog = serde_json::from_str(r#"{"metrics": []}"#).unwrap();
        assert!(catalog.dimensions.is_empty());
        assert!(catalog.filters.is_empty());
    }

    #[test]
    fn test_find_entry_by_category() {
        let catalog = sample_catalog();

        let entry = catalog.find(Category::Filters, "created").unwrap();
        assert_eq!(entry.label, "Created");
        assert_eq!(entry.kind, Some(FilterKind::DateRange));

        assert!(catalog.find(Category::Dimensions, "amount").is_none());
        assert_eq!(
            catalog.find(Category::Metrics, "amount").map(|e| e.label),
            Some("Amount")
        );
    }

    #[test]
    fn test_column_accessor_defaults_to_id() {
        let column = ColumnConfig::new("region", "Region");
        assert_eq!(column.accessor(), "region");

        let column: ColumnConfig =
            serde_json::from_str(r#"{"id": "rev", "label": "Revenue", "accessor": "amount"}"#)
                .unwrap();
        assert_eq!(column.accessor(), "amount");
        assert!(!column.sortable);
    }
}
