//! Filter selection model
//!
//! The in-progress (or last committed) choice of dimensions, metrics and
//! filters. Dimensions and metrics are ordered key lists; filters are a map
//! from filter id to value. Operations that apply to any category go through
//! [`Slot`], so the list/map split is handled once per variant instead of
//! branching on the category everywhere.

use super::catalog::{Catalog, CatalogEntry, Category, FilterKind};
use super::criteria::{Criteria, FilterValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selected keys for every category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selection {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub filters: BTreeMap<String, FilterValue>,
}

/// Mutable view over one category of a selection
#[derive(Debug)]
pub enum Slot<'a> {
    List(&'a mut Vec<String>),
    Map(&'a mut BTreeMap<String, FilterValue>),
}

impl Slot<'_> {
    /// Remove the key if present, otherwise add it
    ///
    /// Lists append at the end; maps insert an empty text placeholder.
    pub fn toggle(&mut self, key: &str) {
        match self {
            Slot::List(values) => {
                if let Some(pos) = values.iter().position(|v| v == key) {
                    values.remove(pos);
                } else {
                    values.push(key.to_string());
                }
            }
            Slot::Map(values) => {
                if values.remove(key).is_none() {
                    values.insert(key.to_string(), FilterValue::default());
                }
            }
        }
    }

    /// Remove a single key, returning whether anything was removed
    pub fn delete(&mut self, key: &str) -> bool {
        match self {
            Slot::List(values) => {
                let before = values.len();
                values.retain(|v| v != key);
                values.len() != before
            }
            Slot::Map(values) => values.remove(key).is_some(),
        }
    }

    /// Reset to an empty list or an empty map
    pub fn clear(&mut self) {
        match self {
            Slot::List(values) => **values = Vec::new(),
            Slot::Map(values) => **values = BTreeMap::new(),
        }
    }
}

impl Selection {
    pub fn from_criteria(criteria: &Criteria) -> Self {
        Self {
            dimensions: criteria.dimensions.clone(),
            metrics: criteria.metrics.clone(),
            filters: criteria.filters.clone(),
        }
    }

    pub fn slot(&mut self, category: Category) -> Slot<'_> {
        match category {
            Category::Dimensions => Slot::List(&mut self.dimensions),
            Category::Metrics => Slot::List(&mut self.metrics),
            Category::Filters => Slot::Map(&mut self.filters),
        }
    }

    /// Toggle a dimension or metric key
    ///
    /// Filters go through [`Selection::toggle_filter`]; passing
    /// `Category::Filters` here toggles the filter id the same way.
    pub fn toggle_dimension_or_metric(&mut self, category: Category, key: &str) {
        self.slot(category).toggle(key);
    }

    /// Toggle a filter id in or out of the map
    pub fn toggle_filter(&mut self, id: &str) {
        self.slot(Category::Filters).toggle(id);
    }

    /// Toggle any category's key
    pub fn toggle(&mut self, category: Category, key: &str) {
        self.slot(category).toggle(key);
    }

    /// Overwrite the value of an active filter
    ///
    /// Returns `false` and changes nothing when the filter is not active.
    pub fn set_filter_value(&mut self, id: &str, value: FilterValue) -> bool {
        match self.filters.get_mut(id) {
            Some(existing) => {
                *existing = value;
                true
            }
            None => false,
        }
    }

    pub fn delete_filter(&mut self, id: &str) -> bool {
        self.slot(Category::Filters).delete(id)
    }

    /// Remove one key from a category (chip delete)
    pub fn delete(&mut self, category: Category, key: &str) -> bool {
        self.slot(category).delete(key)
    }

    pub fn clear_category(&mut self, category: Category) {
        self.slot(category).clear();
    }

    pub fn contains(&self, category: Category, key: &str) -> bool {
        match category {
            Category::Dimensions => self.dimensions.iter().any(|v| v == key),
            Category::Metrics => self.metrics.iter().any(|v| v == key),
            Category::Filters => self.filters.contains_key(key),
        }
    }

    /// Whether the checklist entry for `key` is checked
    pub fn is_checked(&self, category: Category, key: &str) -> bool {
        self.contains(category, key)
    }

    /// Number of selected keys, for the toolbar badges
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Dimensions => self.dimensions.len(),
            Category::Metrics => self.metrics.len(),
            Category::Filters => self.filters.len(),
        }
    }

    /// Selected keys in selection order
    pub fn keys(&self, category: Category) -> Vec<&str> {
        match category {
            Category::Dimensions => self.dimensions.iter().map(String::as_str).collect(),
            Category::Metrics => self.metrics.iter().map(String::as_str).collect(),
            Category::Filters => self.filters.keys().map(String::as_str).collect(),
        }
    }

    /// Selectable checklist entries for a category
    ///
    /// Case-insensitive substring match on the label; an empty term matches
    /// everything. Filters that are already configured are left out.
    pub fn search<'a>(
        &self,
        catalog: &'a Catalog,
        category: Category,
        term: &str,
    ) -> Vec<CatalogEntry<'a>> {
        catalog
            .entries(category)
            .into_iter()
            .filter(|entry| category != Category::Filters || !self.filters.contains_key(entry.key))
            .filter(|entry| matches_term(entry.label, term))
            .collect()
    }

    /// Chips for the current selection
    ///
    /// Keys without a catalog entry are stale and skipped.
    pub fn selected_chips<'a>(
        &self,
        catalog: &'a Catalog,
        category: Category,
    ) -> Vec<CatalogEntry<'a>> {
        self.keys(category)
            .into_iter()
            .filter_map(|key| catalog.find(category, key))
            .collect()
    }

    /// Inputs for configured filters whose label matches the search term
    ///
    /// Untyped filters have no input and are left out.
    pub fn configured_filters<'a>(&self, catalog: &'a Catalog, term: &str) -> Vec<FilterInput<'a>> {
        self.filters
            .iter()
            .filter_map(|(id, value)| {
                let item = catalog.filter(id)?;
                (!item.kind.is_untyped() && matches_term(&item.label, term)).then(|| FilterInput {
                    id: &item.id,
                    label: &item.label,
                    kind: item.kind,
                    value: value.clone(),
                })
            })
            .collect()
    }
}

/// A configured filter shown as an input in the filters dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub kind: FilterKind,
    pub value: FilterValue,
}

fn matches_term(label: &str, term: &str) -> bool {
    term.is_empty() || label.to_lowercase().contains(&term.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{CatalogItem, FilterItem};
    use crate::model::date_range::DateRange;
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog {
            dimensions: vec![
                CatalogItem {
                    value: "region".to_string(),
                    label: "Region".to_string(),
                },
                CatalogItem {
                    value: "channel".to_string(),
                    label: "Sales Channel".to_string(),
                },
            ],
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
                    label: "Created At".to_string(),
                    kind: FilterKind::DateRange,
                },
            ],
        }
    }

    #[test]
    fn test_toggle_appends_and_removes_preserving_order() {
        let mut selection = Selection::default();
        selection.toggle_dimension_or_metric(Category::Dimensions, "region");
        selection.toggle_dimension_or_metric(Category::Dimensions, "channel");
        selection.toggle_dimension_or_metric(Category::Dimensions, "city");
        assert_eq!(selection.dimensions, vec!["region", "channel", "city"]);

        selection.toggle_dimension_or_metric(Category::Dimensions, "channel");
        assert_eq!(selection.dimensions, vec!["region", "city"]);
        assert!(selection.metrics.is_empty());
    }

    #[test]
    fn test_toggle_filter_inserts_placeholder_and_deletes() {
        let mut selection = Selection::default();
        selection.toggle_filter("q");
        assert_eq!(selection.filters["q"], FilterValue::Text(String::new()));

        selection.set_filter_value("q", FilterValue::Text("east".to_string()));
        selection.toggle_filter("q");
        assert!(selection.filters.is_empty());
    }

    #[test]
    fn test_set_filter_value_does_not_create_filters() {
        let mut selection = Selection::default();
        assert!(!selection.set_filter_value("q", FilterValue::Text("x".to_string())));
        assert!(selection.filters.is_empty());

        selection.toggle_filter("created");
        let range = DateRange::all_time();
        assert!(selection.set_filter_value("created", FilterValue::DateRange(range.clone())));
        assert_eq!(selection.filters["created"], FilterValue::DateRange(range));
    }

    #[test]
    fn test_delete_and_clear() {
        let mut selection = Selection {
            dimensions: vec!["region".to_string(), "channel".to_string()],
            metrics: vec!["amount".to_string()],
            filters: BTreeMap::from([("q".to_string(), FilterValue::Text("a".to_string()))]),
        };

        assert!(selection.delete(Category::Dimensions, "region"));
        assert!(!selection.delete(Category::Dimensions, "region"));
        assert_eq!(selection.dimensions, vec!["channel"]);

        assert!(selection.delete_filter("q"));
        assert!(!selection.delete_filter("q"));

        selection.clear_category(Category::Metrics);
        assert!(selection.metrics.is_empty());
        assert_eq!(selection.dimensions, vec!["channel"]);
    }

    #[test]
    fn test_clear_keeps_list_and_map_shapes() {
        let mut selection = Selection::default();
        selection.toggle_filter("q");
        selection.clear_category(Category::Filters);
        selection.clear_category(Category::Dimensions);

        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["filters"], serde_json::json!({}));
        assert_eq!(json["dimensions"], serde_json::json!([]));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        let selection = Selection::default();

        let all = selection.search(&catalog, Category::Dimensions, "");
        assert_eq!(all.len(), 2);

        let hits = selection.search(&catalog, Category::Dimensions, "CHAN");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "channel");

        assert!(selection.search(&catalog, Category::Metrics, "zzz").is_empty());
    }

    #[test]
    fn test_search_excludes_configured_filters() {
        let catalog = catalog();
        let mut selection = Selection::default();
        selection.toggle_filter("q");

        let keys: Vec<_> = selection
            .search(&catalog, Category::Filters, "")
            .iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["created"]);

        // Selected dimensions stay in the list so they can be unchecked
        selection.toggle(Category::Dimensions, "region");
        assert_eq!(selection.search(&catalog, Category::Dimensions, "").len(), 2);
        assert!(selection.is_checked(Category::Dimensions, "region"));
    }

    #[test]
    fn test_selected_chips_skip_stale_keys() {
        let catalog = catalog();
        let mut selection = Selection::default();
        selection.toggle(Category::Dimensions, "channel");
        selection.toggle(Category::Dimensions, "removed");
        selection.toggle(Category::Dimensions, "region");
        selection.toggle_filter("gone");

        let labels: Vec<_> = selection
            .selected_chips(&catalog, Category::Dimensions)
            .iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Sales Channel", "Region"]);
        assert!(selection.selected_chips(&catalog, Category::Filters).is_empty());
        assert_eq!(selection.count(Category::Dimensions), 3);
    }

    #[test]
    fn test_configured_filters_follow_search_term() {
        let catalog = catalog();
        let mut selection = Selection::default();
        selection.toggle_filter("q");
        selection.toggle_filter("created");

        let inputs = selection.configured_filters(&catalog, "");
        assert_eq!(inputs.len(), 2);

        let inputs = selection.configured_filters(&catalog, "created");
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].kind, FilterKind::DateRange);
    }

    #[test]
    fn test_untyped_filter_gets_chip_but_no_input() {
        let mut catalog = catalog();
        catalog.filters.push(FilterItem {
            id: "active".to_string(),
            label: "Active".to_string(),
            kind: FilterKind::Untyped,
        });
        let mut selection = Selection::default();
        selection.toggle_filter("active");

        assert!(selection.is_checked(Category::Filters, "active"));
        assert_eq!(selection.selected_chips(&catalog, Category::Filters).len(), 1);
        assert!(selection.configured_filters(&catalog, "").is_empty());
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_restores_list(
            initial in proptest::collection::vec("[a-d]{1,2}", 0..6),
            key in "[a-d]{1,2}",
        ) {
            let mut seen = std::collections::HashSet::new();
            let dimensions: Vec<String> =
                initial.into_iter().filter(|k| seen.insert(k.clone())).collect();
            let mut selection = Selection { dimensions: dimensions.clone(), ..Default::default() };

            selection.toggle_dimension_or_metric(Category::Dimensions, &key);
            selection.toggle_dimension_or_metric(Category::Dimensions, &key);

            if dimensions.contains(&key) {
                // Removed then re-appended: same members, key moved last
                let mut expected: Vec<String> =
                    dimensions.iter().filter(|k| **k != key).cloned().collect();
                expected.push(key.clone());
                prop_assert_eq!(selection.dimensions, expected);
            } else {
                prop_assert_eq!(selection.dimensions, dimensions);
            }
        }

        #[test]
        fn prop_toggle_filter_twice_restores_map(
            ids in proptest::collection::btree_set("[a-d]", 0..4),
            id in "[a-d]",
        ) {
            let filters: BTreeMap<String, FilterValue> = ids
                .into_iter()
                .map(|k| (k.clone(), FilterValue::Text(String::new())))
                .collect();
            let mut selection = Selection { filters: filters.clone(), ..Default::default() };

            selection.toggle_filter(&id);
            selection.toggle_filter(&id);

            prop_assert_eq!(selection.filters, filters);
        }
    }
}
