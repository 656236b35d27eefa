//! Ledger file readers.
//!
//! Both ledgers arrive as CSV exports addressed by named column; the
//! readers resolve header aliases once, then convert records to typed
//! rows. A field that fails to parse excludes only its own row: the row
//! lands in the load's issue list and the run continues.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

pub mod demand;
pub mod exclusions;
pub mod supply;

pub use demand::{parse_demand_file, DemandLoad};
pub use exclusions::{parse_exclusions_file, parse_exclusions_text};
pub use supply::{parse_supply_file, SupplyLoad};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),
}

/// One row excluded from matching because a field would not parse.
/// Line numbers are 1-based (the header is line 1) for user friendliness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: u64,
    pub message: String,
}

/// Resolve a named column against the header record, case-insensitively.
pub(crate) fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, ParseError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
}

/// Parse a demand-ledger timestamp; date-only values land at midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

/// Parse a time-of-entry cell: either `HH:MM:SS` or a spreadsheet
/// day-fraction float. Empty cells mean midnight.
pub(crate) fn parse_time_of_entry(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(NaiveTime::MIN);
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S") {
        return Some(time);
    }
    let fraction: f64 = trimmed.parse().ok()?;
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let seconds = (fraction * 86_400.0).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_case_insensitive() {
        let headers = csv::StringRecord::from(vec!["Id", "UpdateDate", " Part "]);
        assert_eq!(column(&headers, "id").unwrap(), 0);
        assert_eq!(column(&headers, "part").unwrap(), 2);
        assert!(matches!(
            column(&headers, "Qty"),
            Err(ParseError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-04 09:30:00").is_some());
        assert!(parse_timestamp("2024-03-04T09:30:00").is_some());
        let midnight = parse_timestamp("2024-03-04").unwrap();
        assert_eq!(midnight.time(), NaiveTime::MIN);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_time_of_entry_clock() {
        let t = parse_time_of_entry("09:30:00").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_time_of_entry_day_fraction() {
        let t = parse_time_of_entry("0.5").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_time_of_entry_empty_is_midnight() {
        assert_eq!(parse_time_of_entry("").unwrap(), NaiveTime::MIN);
    }

    #[test]
    fn test_parse_time_of_entry_out_of_range() {
        assert!(parse_time_of_entry("1.5").is_none());
        assert!(parse_time_of_entry("bogus").is_none());
    }
}
