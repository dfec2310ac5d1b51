//! Delimited text report fallback
//!
//! Some report bodies come back as CSV-ish text. Delimiters are sniffed in a
//! fixed order (comma, semicolon, tab); the first parse that yields at least
//! one row under a header of two or more columns wins.

use csv::ReaderBuilder;
use serde_json::Value;

use super::shape::Record;

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Parse a delimited text report into records, or `None` if no delimiter
/// produces a plausible table.
pub fn parse_delimited(text: &str) -> Option<Vec<Record>> {
    for delim in DELIMITERS {
        if let Some(rows) = try_delimiter(text, delim) {
            return Some(rows);
        }
    }
    None
}

fn try_delimiter(text: &str, delim: u8) -> Option<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delim)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.len() < 2 {
        return None;
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.ok()?;
        let mut row = Record::new();
        for (col, cell) in headers.iter().zip(record.iter()) {
            row.insert(col.clone(), Value::String(cell.to_string()));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_delimited() {
        let rows = parse_delimited("Fh,AI\n2026-01-24,123\n2026-01-25,141\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("AI").unwrap(), "123");
    }

    #[test]
    fn test_semicolon_delimited() {
        let rows = parse_delimited("Fh;AI;AE\n2026-01-24;123;0\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("AE").unwrap(), "0");
    }

    #[test]
    fn test_single_column_is_rejected() {
        // A prose body has no second column under any delimiter.
        assert!(parse_delimited("just some text\nmore text\n").is_none());
    }

    #[test]
    fn test_header_only_is_rejected() {
        assert!(parse_delimited("Fh,AI\n").is_none());
    }
}
