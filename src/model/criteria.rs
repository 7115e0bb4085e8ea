//! Criteria - the authoritative report state owned by the host

use super::date_range::DateRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows-per-page options offered by the table footer
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 20, 30, 40];

/// Page size used when the host gives none
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Value of an active filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    DateRange(DateRange),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Text(String::new())
    }
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::DateRange(_) => None,
        }
    }

    pub fn as_date_range(&self) -> Option<&DateRange> {
        match self {
            FilterValue::DateRange(r) => Some(r),
            FilterValue::Text(_) => None,
        }
    }

    /// Short human-readable form for chips and status lines
    pub fn summary(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::DateRange(r) => r.display(),
        }
    }
}

/// Sort direction, `"ASC"`/`"DESC"` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_as: SortDirection,
}

/// Pagination config, optionally annotated with derived metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based
    #[serde(default = "default_page_index")]
    pub page_index: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_page_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,
}

fn default_page_index() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
            total_page_count: None,
            total_items: None,
        }
    }

    /// The same config without derived metadata
    pub fn config(&self) -> Pagination {
        Pagination::new(self.page_index, self.page_size)
    }
}

/// Authoritative query/view state
///
/// Keys the report does not know about are kept in `extra` and passed back
/// to the host untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Criteria {
    pub fn with_pagination(mut self, page_index: usize, page_size: usize) -> Self {
        self.pagination = Some(Pagination::new(page_index, page_size));
        self
    }

    pub fn with_sort(mut self, sort_by: &str, sort_as: SortDirection) -> Self {
        self.sort = Some(Sort {
            sort_by: Some(sort_by.to_string()),
            sort_as,
        });
        self
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort.as_ref().and_then(|s| s.sort_by.as_deref())
    }

    pub fn sort_as(&self) -> SortDirection {
        self.sort.as_ref().map(|s| s.sort_as).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_criteria_deserializes_host_json() {
        let criteria: Criteria = serde_json::from_str(
            r#"{
                "dimensions": ["region"],
                "filters": {
                    "q": "east",
                    "created": {"startDate": "2024-01-01", "endDate": "2024-01-31", "label": "Custom"}
                },
                "pagination": {"pageIndex": 2, "pageSize": 10},
                "sort": {"sortBy": "amount", "sortAs": "DESC"},
                "reportId": 7
            }"#,
        )
        .unwrap();

        assert_eq!(criteria.dimensions, vec!["region"]);
        assert!(criteria.metrics.is_empty());
        assert_eq!(criteria.filters["q"], FilterValue::Text("east".to_string()));
        let range = criteria.filters["created"].as_date_range().unwrap();
        assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.label, "Custom");
        assert_eq!(criteria.pagination, Some(Pagination::new(2, 10)));
        assert_eq!(criteria.sort_by(), Some("amount"));
        assert_eq!(criteria.sort_as(), SortDirection::Desc);
        assert_eq!(criteria.extra["reportId"], serde_json::json!(7));
    }

    #[test]
    fn test_criteria_accepts_timestamp_bounds() {
        let criteria: Criteria = serde_json::from_str(
            r#"{"filters": {"created": {
                "startDate": "2024-01-01T00:00:00.000Z",
                "endDate": "2024-01-31T00:00:00.000Z",
                "label": "Custom"
            }}}"#,
        )
        .unwrap();
        let range = criteria.filters["created"].as_date_range().unwrap();
        assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_criteria_serializes_camel_case_and_keeps_extra_keys() {
        let mut criteria = Criteria::default()
            .with_pagination(1, 5)
            .with_sort("region", SortDirection::Asc);
        criteria
            .extra
            .insert("owner".to_string(), serde_json::json!("ops"));

        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["pagination"]["pageIndex"], 1);
        assert_eq!(json["sort"]["sortAs"], "ASC");
        assert_eq!(json["owner"], "ops");
        assert!(json["pagination"].get("totalItems").is_none());
    }

    #[test]
    fn test_pagination_defaults_when_partial() {
        let pagination: Pagination = serde_json::from_str(r#"{"pageIndex": 3}"#).unwrap();
        assert_eq!(pagination.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(pagination.page_index, 3);
    }

    #[test]
    fn test_sort_direction_toggle() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
        assert_eq!(SortDirection::default().as_str(), "ASC");
    }
}
