//! X-axis extraction and formatting
//!
//! The x value for a record is the first present field among a prioritized
//! list of timestamp-like keys, falling back to the record's position. When
//! an x string parses as a calendar date/time it also yields a sort key;
//! display always uses the compact two-digit-year form (`yymmdd`, plus
//! ` HH:MM:SS` when the axis carries a time component).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::report::Record;

/// Timestamp-like keys, in priority order
pub const X_KEY_PRIORITY: [&str; 6] = ["Fh", "fh", "Fecha", "fecha", "ActDate", "actdate"];

/// Extract the x string for a record, falling back to the row index
pub fn extract_x(record: &Record, index: usize) -> String {
    for key in X_KEY_PRIORITY {
        match record.get(key) {
            Some(Value::Null) | None => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
        }
    }
    index.to_string()
}

/// Parse an x string as a calendar date/time, if it is one
pub fn parse_x(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Whether any x value carries a time component
pub fn has_time_component(values: &[String]) -> bool {
    let re = match Regex::new(r"[T ]\d{2}:\d{2}|\d{2}:\d{2}:\d{2}") {
        Ok(re) => re,
        Err(_) => return false,
    };
    values.iter().any(|v| re.is_match(v))
}

/// Compact display form: `yymmdd` or `yymmdd HH:MM:SS`.
///
/// Unparseable values fall back to their embedded digit run (covers the
/// concentrator's `YYYYMMDDHHMMSS` stamps) and finally to the raw string.
pub fn format_x(s: &str, has_time: bool) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(dt) = parse_x(trimmed) {
        return if has_time {
            dt.format("%y%m%d %H:%M:%S").to_string()
        } else {
            dt.format("%y%m%d").to_string()
        };
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 8 {
        let compact = format!("{}{}{}", &digits[2..4], &digits[4..6], &digits[6..8]);
        if has_time && digits.len() >= 14 {
            return format!(
                "{} {}:{}:{}",
                compact,
                &digits[8..10],
                &digits[10..12],
                &digits[12..14]
            );
        }
        return compact;
    }

    trimmed.to_string()
}
