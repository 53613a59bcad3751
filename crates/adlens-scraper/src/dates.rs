//! Timestamp parsing shared by both adapters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Converts UNIX seconds to UTC. Out-of-range values yield `None`.
#[must_use]
pub fn from_unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Parses an upstream date that may be RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DD`, UNIX seconds as a number, or UNIX seconds as a digit string.
///
/// Naive forms are read as UTC.
#[must_use]
pub fn parse_flexible(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map(|f| f as i64)
            })
            .and_then(from_unix_seconds),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(from_unix_seconds);
    }
    None
}

/// Returns the pair ordered so that `start <= end`, plus whether a swap happened.
#[must_use]
pub fn ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>, bool) {
    if start > end {
        (end, start, true)
    } else {
        (start, end, false)
    }
}
