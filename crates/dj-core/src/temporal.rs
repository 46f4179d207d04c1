//! # Temporal Parsing: `date` and `date-time` Leaves
//!
//! Wire payloads carry dates as `YYYY-MM-DD` text and timestamps as RFC 3339
//! text. This module parses both into `chrono` values and renders them back.
//!
//! ## Round-Trip Invariant
//!
//! `parse_datetime(&format_datetime(&dt)) == dt` for every parsed `dt`. The
//! original UTC offset is kept (not normalized), and sub-second precision is
//! rendered with as many digits as it has, so nothing is lost on re-encode.
//! UTC renders with the `Z` suffix.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use thiserror::Error;

/// Why a temporal literal was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("invalid RFC 3339 date-time {input:?}: {reason}")]
    InvalidDateTime { input: String, reason: String },
}

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns `TemporalError::InvalidDate` for any other layout or an
/// impossible calendar day.
pub fn parse_date(s: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| TemporalError::InvalidDate {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parse an RFC 3339 timestamp, keeping its offset.
///
/// # Errors
///
/// Returns `TemporalError::InvalidDateTime` if the text is not RFC 3339.
pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, TemporalError> {
    DateTime::parse_from_rfc3339(s).map_err(|e| TemporalError::InvalidDateTime {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render a timestamp as RFC 3339 (`Z` for UTC, minimal sub-second digits).
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
