//! Download exports
//!
//! Every successful render retains the displayed rows and columns as an
//! [`ExportSet`] backing the CSV download, plus the verbatim upstream text
//! for the XML download. The CSV encoding quotes every field and doubles
//! embedded quotes; the delimiter and the fixed download filenames differ
//! per dashboard, matching what each dashboard's users already consume.

use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which dashboard a render was produced for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dashboard {
    /// The meter operations dashboard (comma-delimited CSV)
    #[default]
    Meters,
    /// The technical analysis dashboard (semicolon-delimited CSV)
    Technical,
}

impl Dashboard {
    pub fn delimiter(&self) -> u8 {
        match self {
            Dashboard::Meters => b',',
            Dashboard::Technical => b';',
        }
    }

    pub fn csv_filename(&self) -> &'static str {
        match self {
            Dashboard::Meters => "resultado.csv",
            Dashboard::Technical => "reporte.csv",
        }
    }

    pub fn xml_filename(&self) -> &'static str {
        match self {
            Dashboard::Meters => "resultado.xml",
            Dashboard::Technical => "reporte.xml",
        }
    }
}

/// Errors during export encoding
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when flushing the writer buffer fails
    #[error("CSV write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The last rendered rows and columns, retained verbatim for CSV export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportSet {
    /// Column order exactly as displayed
    pub columns: Vec<String>,
    /// One cell per column per row, already formatted as display text
    pub rows: Vec<Vec<String>>,
}

impl ExportSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Encode as CSV: every field quoted, quotes doubled, displayed column
    /// order preserved.
    pub fn to_csv(&self, dashboard: Dashboard) -> Result<String, ExportError> {
        let mut writer = WriterBuilder::new()
            .delimiter(dashboard.delimiter())
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}
