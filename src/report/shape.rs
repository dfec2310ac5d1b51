//! Payload shape classification
//!
//! A report payload can arrive in several shapes. Classification is ordered
//! and the first match wins:
//!
//! 1. an object whose nested `parsed` object carries an array-valued `rows`
//!    field (with an optional `cols` column-order hint),
//! 2. an object that carries `rows`/`cols` directly,
//! 3. a bare array of records,
//! 4. a single plain object, treated as a one-record list,
//! 5. anything else is unrecognized and falls back to a raw display.
//!
//! Each recognized shape converts into a flat record list. Matrix rows (an
//! array per row) are zipped against the column hint; object rows are taken
//! as they are.

use serde_json::{Map, Value};

/// One report record: field code to value
pub type Record = Map<String, Value>;

/// Classified payload shape, one tag per recognized layout
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// `{"parsed": {"rows": [...], "cols": [...]}}`
    NestedRows { rows: Vec<Value>, cols: Vec<String> },
    /// `{"rows": [...], "cols": [...]}`
    Rows { rows: Vec<Value>, cols: Vec<String> },
    /// A bare array of records
    Array(Vec<Value>),
    /// A single plain object, interpreted as a one-record list
    Single(Record),
    /// Nothing above matched; the value is kept verbatim for raw display
    Unrecognized(Value),
}

impl PayloadShape {
    /// Convert the classified shape into a record list, if one exists.
    ///
    /// Returns `None` only for [`PayloadShape::Unrecognized`]. Row entries
    /// that are neither objects nor zip-able arrays contribute empty records,
    /// so they still occupy a row without inventing columns.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            PayloadShape::NestedRows { rows, cols } | PayloadShape::Rows { rows, cols } => {
                Some(rows_to_records(rows, &cols))
            }
            PayloadShape::Array(rows) => Some(rows_to_records(rows, &[])),
            PayloadShape::Single(record) => Some(vec![record]),
            PayloadShape::Unrecognized(_) => None,
        }
    }
}

/// Classify a payload value. Ordered, first match wins.
pub fn classify(payload: Value) -> PayloadShape {
    if let Value::Object(ref obj) = payload {
        if let Some(Value::Object(parsed)) = obj.get("parsed") {
            if let Some(Value::Array(rows)) = parsed.get("rows") {
                return PayloadShape::NestedRows {
                    rows: rows.clone(),
                    cols: column_hint(parsed.get("cols")),
                };
            }
        }
        if let Some(Value::Array(rows)) = obj.get("rows") {
            return PayloadShape::Rows {
                rows: rows.clone(),
                cols: column_hint(obj.get("cols")),
            };
        }
    }

    match payload {
        Value::Array(rows) => PayloadShape::Array(rows),
        Value::Object(obj) => PayloadShape::Single(obj),
        other => PayloadShape::Unrecognized(other),
    }
}

/// Column set across a record list: the union of keys in first-seen order
pub fn column_union(records: &[Record]) -> Vec<String> {
    let mut cols = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                cols.push(key.clone());
            }
        }
    }
    cols
}

/// Read an optional `cols` hint as a list of column names
fn column_hint(cols: Option<&Value>) -> Vec<String> {
    match cols {
        Some(Value::Array(items)) => items.iter().map(stringify_key).collect(),
        _ => Vec::new(),
    }
}

fn stringify_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn raw row values into records, zipping arrays against the column hint
fn rows_to_records(rows: Vec<Value>, cols: &[String]) -> Vec<Record> {
    rows.into_iter()
        .map(|row| match row {
            Value::Object(record) => record,
            Value::Array(cells) if !cols.is_empty() => {
                let mut record = Record::new();
                for (col, cell) in cols.iter().zip(cells) {
                    record.insert(col.clone(), cell);
                }
                record
            }
            _ => Record::new(),
        })
        .collect()
}
