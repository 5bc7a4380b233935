//! Lenient date parsing for upstream timestamps

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("invalid year pattern"));

/// Naive (offset-free) formats tried after RFC 3339
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp into UTC-normalized naive time.
///
/// Accepts RFC 3339 (`Z` or offsets), offset-free ISO datetimes and bare
/// `YYYY-MM-DD` dates (midnight).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Year of a date-ish string: full dates first, then the first 4-digit run.
pub fn parse_year_str(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(chrono::Datelike::year(&d));
    }
    YEAR.find(s)
        .and_then(|m| m.as_str().parse().ok())
        .filter(|&y| y > 0)
}

/// Year of a JSON value: integers pass through, strings are parsed.
pub fn parse_year(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()).filter(|&y| y > 0),
        Value::String(s) => parse_year_str(s),
        _ => None,
    }
}
