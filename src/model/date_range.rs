//! Date ranges and the picker's predefined ranges

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

/// Label stored for ranges entered by hand
pub const CUSTOM_LABEL: &str = "Custom";

/// Label shown when no range is set
pub const ALL_TIME_LABEL: &str = "All Time";

/// `YYYY-MM-DD to YYYY-MM-DD`, also accepting `..` and `-` as separator
static CUSTOM_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})\s*(?:to|\.\.|-|–)\s*(\d{4}-\d{2}-\d{2})\s*$")
        .expect("custom range pattern is valid")
});

/// A resolved date range filter value
///
/// Both bounds are inclusive days. `All Time` has no bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, deserialize_with = "deserialize_day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_day")]
    pub end_date: Option<NaiveDate>,
    pub label: String,
}

impl DateRange {
    pub fn all_time() -> Self {
        Self {
            start_date: None,
            end_date: None,
            label: ALL_TIME_LABEL.to_string(),
        }
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            label: CUSTOM_LABEL.to_string(),
        }
    }

    /// Whether a day falls inside the range
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date.map_or(true, |s| day >= s) && self.end_date.map_or(true, |e| day <= e)
    }

    /// Text shown in the picker field
    pub fn display(&self) -> String {
        match (self.label.as_str(), self.start_date, self.end_date) {
            (CUSTOM_LABEL, Some(start), Some(end)) => {
                format!("{} - {}", format_day(start), format_day(end))
            }
            ("", _, _) => ALL_TIME_LABEL.to_string(),
            (label, _, _) => label.to_string(),
        }
    }
}

/// Read a bound written as `YYYY-MM-DD` or as a full timestamp
///
/// Timestamps keep the calendar day they are written in, ignoring the
/// offset.
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

fn deserialize_day<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) => parse_day(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {}", text))),
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format("%b %-d, %Y").to_string()
}

/// Predefined ranges offered by the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    ThisWeek,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    AllTime,
    Custom,
}

impl DateRangePreset {
    pub fn all() -> [DateRangePreset; 7] {
        [
            DateRangePreset::ThisWeek,
            DateRangePreset::Last7Days,
            DateRangePreset::Last30Days,
            DateRangePreset::ThisMonth,
            DateRangePreset::LastMonth,
            DateRangePreset::AllTime,
            DateRangePreset::Custom,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRangePreset::ThisWeek => "This Week",
            DateRangePreset::Last7Days => "Last 7 Days",
            DateRangePreset::Last30Days => "Last 30 Days",
            DateRangePreset::ThisMonth => "This Month",
            DateRangePreset::LastMonth => "Last Month",
            DateRangePreset::AllTime => ALL_TIME_LABEL,
            DateRangePreset::Custom => CUSTOM_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<DateRangePreset> {
        Self::all().into_iter().find(|p| p.label() == label)
    }

    /// Resolve the preset against `today`
    ///
    /// Returns `None` for `Custom`, whose bounds come from user input.
    /// Weeks start on Sunday.
    pub fn resolve(&self, today: NaiveDate) -> Option<DateRange> {
        let (start, end) = match self {
            DateRangePreset::ThisWeek => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                (today - Duration::days(offset), today)
            }
            DateRangePreset::Last7Days => (today - Duration::days(6), today),
            DateRangePreset::Last30Days => (today - Duration::days(29), today),
            DateRangePreset::ThisMonth => (today.with_day(1)?, today),
            DateRangePreset::LastMonth => {
                let first_this_month = today.with_day(1)?;
                let first_last_month = first_this_month.checked_sub_months(Months::new(1))?;
                (first_last_month, first_this_month.pred_opt()?)
            }
            DateRangePreset::AllTime => return Some(DateRange::all_time()),
            DateRangePreset::Custom => return None,
        };
        Some(DateRange {
            start_date: Some(start),
            end_date: Some(end),
            label: self.label().to_string(),
        })
    }
}

/// Parse a hand-entered range
///
/// The end day may not lie after `today` and the start may not lie after
/// the end.
pub fn parse_custom_range(input: &str, today: NaiveDate) -> Result<DateRange> {
    let Some(captures) = CUSTOM_RANGE_REGEX.captures(input) else {
        bail!("Expected YYYY-MM-DD to YYYY-MM-DD");
    };
    let start = NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d")
        .with_context(|| format!("Invalid start date: {}", &captures[1]))?;
    let end = NaiveDate::parse_from_str(&captures[2], "%Y-%m-%d")
        .with_context(|| format!("Invalid end date: {}", &captures[2]))?;

    if start > end {
        bail!("Start date is after end date");
    }
    if end > today {
        bail!("End date is in the future");
    }
    Ok(DateRange::custom(start, end))
}
