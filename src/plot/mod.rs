//! Time-series plot derivation
//!
//! Table-mode record lists can carry plottable curves. A column becomes a
//! series when at least one record holds a numeric value in it, after a
//! fixed set of metadata columns (report/session identifiers) is excluded by
//! name so numeric-looking identifiers never plot. At most the first six
//! qualifying columns are kept; the rest are dropped.
//!
//! The x-axis is chronological only when every extracted x value parses as a
//! calendar date/time; otherwise the axis is categorical and rows keep their
//! original order. The "maximum" overlay is a pure reduction over the
//! derived series, recomputed in full on every request.

pub mod axis;

use serde::Serialize;
use serde_json::Value;

use crate::report::{column_union, Record};

/// Columns excluded from series derivation before the numeric test
pub const METADATA_KEYS: [&str; 9] = [
    "IdRpt",
    "IdPet",
    "Version",
    "recordTag",
    "Cnc.Id",
    "Cnt.Id",
    "Report.IdRpt",
    "Report.IdPet",
    "Report.Version",
];

/// Cap on plotted series, for readability
pub const MAX_SERIES: usize = 6;

/// A derived set of plottable series sharing one x-axis
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlotSet {
    /// Raw x values, one per row, in plot order
    pub x: Vec<String>,
    /// Compact display form of each x value (`yymmdd[ HH:MM:SS]`)
    pub x_display: Vec<String>,
    /// True when every x value parsed as a date/time and rows were sorted
    pub chronological: bool,
    pub series: Vec<PlotSeries>,
}

/// One plotted column
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlotSeries {
    /// Field code of the source column
    pub name: String,
    /// One entry per row; None where the cell was not numeric
    pub values: Vec<Option<f64>>,
}

/// The highest y-value across all series and points
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MaxPoint {
    pub series: String,
    pub x: String,
    pub x_display: String,
    pub y: f64,
}

/// Locale-flexible numeric reading of a cell: accepts JSON numbers and
/// strings with either decimal separator; rejects empty, null, and
/// everything else.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            // f64::parse accepts "inf"/"NaN" spellings; those are not
            // meter readings
            s.replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Derive plot series from a record list. Returns `None` when no column
/// qualifies.
pub fn derive(records: &[Record]) -> Option<PlotSet> {
    if records.is_empty() {
        return None;
    }

    let candidates: Vec<String> = column_union(records)
        .into_iter()
        .filter(|c| !METADATA_KEYS.contains(&c.as_str()))
        .filter(|c| records.iter().any(|r| r.get(c).and_then(numeric_value).is_some()))
        .take(MAX_SERIES)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let x_raw: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| axis::extract_x(r, i))
        .collect();

    let parsed: Vec<Option<chrono::NaiveDateTime>> =
        x_raw.iter().map(|s| axis::parse_x(s)).collect();
    let chronological = parsed.iter().all(Option::is_some);

    let mut order: Vec<usize> = (0..records.len()).collect();
    if chronological {
        order.sort_by_key(|&i| parsed[i]);
    }

    let has_time = axis::has_time_component(&x_raw);
    let x: Vec<String> = order.iter().map(|&i| x_raw[i].clone()).collect();
    let x_display: Vec<String> = x.iter().map(|s| axis::format_x(s, has_time)).collect();

    let series = candidates
        .into_iter()
        .map(|name| {
            let values = order
                .iter()
                .map(|&i| records[i].get(&name).and_then(numeric_value))
                .collect();
            PlotSeries { name, values }
        })
        .collect();

    Some(PlotSet {
        x,
        x_display,
        chronological,
        series,
    })
}

impl PlotSet {
    /// Find the single highest point across all series. Strictly-greater
    /// comparison, so the first occurrence in series/row order wins ties.
    pub fn max_point(&self) -> Option<MaxPoint> {
        let mut best: Option<MaxPoint> = None;
        for series in &self.series {
            for (i, value) in series.values.iter().enumerate() {
                let y = match value {
                    Some(y) => *y,
                    None => continue,
                };
                let better = match &best {
                    Some(b) => y > b.y,
                    None => true,
                };
                if better {
                    best = Some(MaxPoint {
                        series: series.name.clone(),
                        x: self.x[i].clone(),
                        x_display: self.x_display[i].clone(),
                        y,
                    });
                }
            }
        }
        best
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
    fn test_numeric_value_locale_flexible() {
        assert_eq!(numeric_value(&json!("1,5")), Some(1.5));
        assert_eq!(numeric_value(&json!("1.5")), Some(1.5));
        assert_eq!(numeric_value(&json!(2)), Some(2.0));
        assert_eq!(numeric_value(&json!("")), None);
        assert_eq!(numeric_value(&json!(null)), None);
        assert_eq!(numeric_value(&json!("abc")), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }

    #[test]
    fn test_numeric_value_rejects_non_finite_spellings() {
        assert_eq!(numeric_value(&json!("inf")), None);
        assert_eq!(numeric_value(&json!("-inf")), None);
        assert_eq!(numeric_value(&json!("infinity")), None);
        assert_eq!(numeric_value(&json!("NaN")), None);
    }

    #[test]
    fn test_metadata_columns_never_plot() {
        let rows = records(json!([
            {"IdPet": "12345", "Cnt.Id": "999", "AI": "1"},
            {"IdPet": "12346", "Cnt.Id": "999", "AI": "2"}
        ]));
        let plot = derive(&rows).unwrap();
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].name, "AI");
    }

    #[test]
    fn test_series_cap_at_six() {
        let rows = records(json!([
            {"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6, "g": 7, "h": 8}
        ]));
        let plot = derive(&rows).unwrap();
        let names: Vec<&str> = plot.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_textual_records_yield_no_plot() {
        let rows = records(json!([{"name": "alpha"}, {"name": "beta"}]));
        assert!(derive(&rows).is_none());
    }

    #[test]
    fn test_chronological_sort_when_all_dates_parse() {
        let rows = records(json!([
            {"Fh": "2026-01-26", "AI": "3"},
            {"Fh": "2026-01-24", "AI": "1"},
            {"Fh": "2026-01-25", "AI": "2"}
        ]));
        let plot = derive(&rows).unwrap();
        assert!(plot.chronological);
        assert_eq!(plot.x, vec!["2026-01-24", "2026-01-25", "2026-01-26"]);
        assert_eq!(
            plot.series[0].values,
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(plot.x_display, vec!["260124", "260125", "260126"]);
    }

    #[test]
    fn test_categorical_axis_keeps_row_order() {
        let rows = records(json!([
            {"Fh": "slot-B", "AI": "2"},
            {"Fh": "slot-A", "AI": "1"}
        ]));
        let plot = derive(&rows).unwrap();
        assert!(!plot.chronological);
        assert_eq!(plot.x, vec!["slot-B", "slot-A"]);
    }

    #[test]
    fn test_max_point_picks_highest_series() {
        let rows = records(json!([
            {"Fh": "2026-01-24", "a": 1.0, "b": 5.0, "c": 2.0},
            {"Fh": "2026-01-25", "a": 2.0, "b": 9.0, "c": 3.0},
            {"Fh": "2026-01-26", "a": 3.0, "b": 4.0, "c": 1.0}
        ]));
        let plot = derive(&rows).unwrap();
        let max = plot.max_point().unwrap();
        assert_eq!(max.series, "b");
        assert_eq!(max.x, "2026-01-25");
        assert_eq!(max.y, 9.0);
    }

    #[test]
    fn test_max_point_tie_goes_to_first_seen() {
        let rows = records(json!([
            {"a": 7.0, "b": 7.0},
            {"a": 7.0, "b": 1.0}
        ]));
        let plot = derive(&rows).unwrap();
        let max = plot.max_point().unwrap();
        // Series a row 0 is scanned before the equal peaks in a[1] and b[0]
        assert_eq!(max.series, "a");
        assert_eq!(max.x, "0");
        assert_eq!(max.y, 7.0);
    }

    #[test]
    fn test_max_point_skips_gaps() {
        let rows = records(json!([
            {"a": null, "b": "2,5"},
            {"a": "x", "b": "1"}
        ]));
        let plot = derive(&rows).unwrap();
        let max = plot.max_point().unwrap();
        assert_eq!(max.series, "b");
        assert_eq!(max.y, 2.5);
    }
}
