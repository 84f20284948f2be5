//! Lab date normalization.
//!
//! Exported tests carry ISO-8601 extended dates (`YYYY-MM-DD`). Sheet dates
//! are accepted in a handful of common layouts; the first layout that
//! consumes the whole string wins, so `01/02/2024` is read day-first.
//! Years are always four digits: `05/01/24` is rejected rather than read as
//! year 5.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use bt_model::LabTest;

use crate::error::DateError;

/// Accepted input layouts, in priority order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // ISO
    "%Y/%m/%d",
    "%d/%m/%Y", // European
    "%m/%d/%Y", // US
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%Y%m%d", // compact
];

/// Digit layout of every accepted format: year-first, year-last or compact.
static DATE_SHAPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|\d{8})$")
        .expect("Invalid date shape regex")
});

pub fn parse_date(raw: &str) -> Result<NaiveDate, DateError> {
    let trimmed = raw.trim();
    let error = || DateError {
        input: trimmed.to_string(),
    };
    // chrono's %Y also takes 1-3 digit years.
    if !DATE_SHAPE_REGEX.is_match(trimmed) {
        return Err(error());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(error)
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// ```
/// use bt_core::normalize_date;
///
/// assert_eq!(normalize_date("2024/03/05").unwrap(), "2024-03-05");
/// assert!(normalize_date("March 5th").is_err());
/// ```
pub fn normalize_date(raw: &str) -> Result<String, DateError> {
    parse_date(raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Stable sort of tests by parsed date.
///
/// Any date that does not parse aborts the sort.
pub fn sort_chronologically(tests: Vec<LabTest>) -> Result<Vec<LabTest>, DateError> {
    let mut keyed = tests
        .into_iter()
        .map(|test| parse_date(&test.date).map(|date| (date, test)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by_key(|(date, _)| *date);
    debug!(test_count = keyed.len(), "sorted tests by date");
    Ok(keyed.into_iter().map(|(_, test)| test).collect())
}
