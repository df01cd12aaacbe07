//! Time and date parsing utilities.

use crate::error::{DashError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

/// Fractional seconds with a numeric offset, e.g. `2024-03-01T10:00:00.123+0000`.
const FRACTIONAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
/// Whole seconds with a numeric offset, e.g. `2024-03-01T10:00:00-0300`.
const WHOLE_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Normalize a remote timestamp into a UTC instant.
///
/// Tries, in order:
/// - fractional seconds with offset: `2024-03-01T10:00:00.123456+0000`
/// - whole seconds with offset: `2024-03-01T10:00:00+0000`
/// - RFC3339 (`Z` suffix or `+00:00`), which is how the store writes back
///
/// Never fails: empty input and unparseable input both yield `None`.
#[must_use]
pub fn parse_remote_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let s = value.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(dt) = DateTime::parse_from_str(s, FRACTIONAL_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, WHOLE_SECONDS_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    warn!(value = s, "Unparseable timestamp, treating as absent");
    None
}

/// Format an instant for storage (RFC3339 with `Z`, fraction only as long as needed).
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Whole days elapsed from `from` to `to`, truncated toward zero.
#[must_use]
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Validate a date bound supplied on the command line.
///
/// Accepts the two literal forms the remote query language understands:
/// `2025-01-15` and `2025-01-15 09:30`. The value is returned trimmed and
/// otherwise untouched.
///
/// # Errors
///
/// Returns a validation error naming `field_name` if neither form parses.
pub fn parse_query_date(s: &str, field_name: &str) -> Result<String> {
    let s = s.trim();
    if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").is_ok()
    {
        return Ok(s.to_string());
    }
    Err(DashError::validation(
        field_name,
        "invalid date (use 2025-01-15 or \"2025-01-15 09:30\")",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_fractional_with_offset() {
        let dt = parse_remote_timestamp(Some("2024-03-01T10:00:00.123456+0000")).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_whole_seconds_with_offset() {
        let dt = parse_remote_timestamp(Some("2024-03-01T10:00:00-0300")).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_formats_agree_at_second_resolution() {
        let fractional = parse_remote_timestamp(Some("2024-03-01T10:00:00.123456+0000")).unwrap();
        let whole = parse_remote_timestamp(Some("2024-03-01T10:00:00+0000")).unwrap();
        assert_eq!(fractional.timestamp(), whole.timestamp());
    }

    #[test]
    fn test_parse_rfc3339_readback() {
        let original = Utc.with_ymd_and_hms(2024, 7, 9, 8, 30, 0).unwrap();
        let stored = format_timestamp(&original);
        assert_eq!(stored, "2024-07-09T08:30:00Z");
        assert_eq!(parse_remote_timestamp(Some(&stored)), Some(original));

        let precise = Utc.timestamp_opt(1_720_513_800, 123_456_789).unwrap();
        let stored = format_timestamp(&precise);
        assert_eq!(stored, "2024-07-09T08:30:00.123456789Z");
        assert_eq!(parse_remote_timestamp(Some(&stored)), Some(precise));
    }

    #[test]
    fn test_absent_and_garbage_inputs() {
        assert_eq!(parse_remote_timestamp(None), None);
        assert_eq!(parse_remote_timestamp(Some("")), None);
        assert_eq!(parse_remote_timestamp(Some("   ")), None);
        assert_eq!(parse_remote_timestamp(Some("yesterday")), None);
        assert_eq!(parse_remote_timestamp(Some("2024-13-01T00:00:00+0000")), None);
    }

    #[test]
    fn test_whole_days_between() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_days_between(start, start), 0);
        assert_eq!(
            whole_days_between(start, Utc.with_ymd_and_hms(2024, 3, 7, 11, 59, 0).unwrap()),
            5
        );
        assert_eq!(
            whole_days_between(start, Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()),
            6
        );
    }

    #[test]
    fn test_parse_query_date() {
        assert_eq!(parse_query_date(" 2025-01-15 ", "created_after").unwrap(), "2025-01-15");
        assert!(parse_query_date("2025-01-15 09:30", "created_after").is_ok());
        let err = parse_query_date("15/01/2025", "created_before").unwrap_err();
        assert!(err.to_string().contains("created_before"));
    }
}
