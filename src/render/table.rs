//! Tabular rendering
//!
//! Columns are the union of keys across all records in first-seen order.
//! Missing and null cells render as empty strings; nested values render as
//! their JSON text so a table never hides structure.

use serde::Serialize;
use serde_json::Value;

use crate::report::{column_union, Record};

/// A rendered table: ordered columns and formatted cell text
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_records(records: &[Record]) -> Self {
        let columns = column_union(records);
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).map(format_cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }
}

/// Display text for one cell value
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Value) -> Vec<Record> {
        crate::report::classify(values).into_records().unwrap()
    }

    #[test]
    fn test_heterogeneous_keys_union_in_first_seen_order() {
        let rows = records(json!([
            {"Fh": "2026-01-24", "AI": "1"},
            {"AE": "0", "Fh": "2026-01-25"}
        ]));
        let table = TableView::from_records(&rows);

        assert_eq!(table.columns, vec!["Fh", "AI", "AE"]);
        assert_eq!(table.rows[0], vec!["2026-01-24", "1", ""]);
        assert_eq!(table.rows[1], vec!["2026-01-25", "", "0"]);
    }

    #[test]
    fn test_null_and_missing_render_empty() {
        let rows = records(json!([{"a": null}, {"b": 1}]));
        let table = TableView::from_records(&rows);
        assert_eq!(table.rows[0], vec!["", ""]);
        assert_eq!(table.rows[1], vec!["", "1"]);
    }

    #[test]
    fn test_nested_values_render_as_json_text() {
        let rows = records(json!([{"cfg": {"a": 1}, "list": [1, 2]}]));
        let table = TableView::from_records(&rows);
        assert_eq!(table.rows[0], vec![r#"{"a":1}"#, "[1,2]"]);
    }

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(format_cell(&json!("x")), "x");
        assert_eq!(format_cell(&json!(1.5)), "1.5");
        assert_eq!(format_cell(&json!(true)), "true");
        assert_eq!(format_cell(&json!(null)), "");
    }
}
