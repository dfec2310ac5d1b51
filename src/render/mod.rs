//! Render pipeline
//!
//! One render turns an upstream report envelope into exactly one output
//! mode: a table, a single-record form, an explicit "no data" verdict, or a
//! raw text display when nothing could be recognized. The session retains
//! the displayed rows for CSV export, the verbatim body for XML export, and
//! the derived plot series until the next render replaces them.

pub mod form;
pub mod table;

pub use form::{FormField, FormSection, FormView};
pub use table::{format_cell, TableView};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::export::{Dashboard, ExportError, ExportSet};
use crate::meaning::MeaningMap;
use crate::plot::{self, PlotSet};
use crate::report::{classify, text, xml, Record, ReportEnvelope};

/// The single interpretation chosen for one response
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderOutput {
    Table(TableView),
    Form(FormView),
    /// The response was understood and holds zero records
    NoData,
    /// Nothing matched; show the body verbatim
    Raw { text: String },
}

/// Per-render state: the current output's export backing, raw body, and
/// plot series. Cleared at the start of every render so a failed or empty
/// response can never serve a stale download.
pub struct RenderSession {
    meanings: Arc<MeaningMap>,
    dashboard: Dashboard,
    export: Option<ExportSet>,
    raw_text: Option<String>,
    plot: Option<PlotSet>,
}

impl RenderSession {
    pub fn new() -> Self {
        Self {
            meanings: Arc::new(MeaningMap::empty()),
            dashboard: Dashboard::default(),
            export: None,
            raw_text: None,
            plot: None,
        }
    }

    pub fn set_meanings(&mut self, meanings: Arc<MeaningMap>) {
        self.meanings = meanings;
    }

    /// Drop everything retained from the previous render
    pub fn clear(&mut self) {
        self.export = None;
        self.raw_text = None;
        self.plot = None;
    }

    /// Render one report response. The previous render's retained state is
    /// dropped first, unconditionally.
    pub fn render(
        &mut self,
        method_code: &str,
        envelope: &ReportEnvelope,
        dashboard: Dashboard,
    ) -> RenderOutput {
        self.clear();
        self.dashboard = dashboard;
        self.raw_text = envelope.raw_text().map(str::to_string);

        match classify(envelope.payload().clone()).into_records() {
            Some(records) => self.render_record_list(method_code, records),
            None => self.render_unrecognized(method_code, envelope.payload()),
        }
    }

    /// Render an already-normalized record list, such as a bulk order's
    /// per-meter results. Previous state is dropped first, same as
    /// [`RenderSession::render`].
    pub fn render_batch(
        &mut self,
        method_code: &str,
        records: Vec<Record>,
        dashboard: Dashboard,
    ) -> RenderOutput {
        self.clear();
        self.dashboard = dashboard;
        self.render_record_list(method_code, records)
    }

    fn render_record_list(&mut self, method_code: &str, records: Vec<Record>) -> RenderOutput {
        if records.is_empty() {
            return RenderOutput::NoData;
        }

        if crate::report::is_form_method(method_code) && records.len() == 1 {
            let view = FormView::from_record(method_code, &records[0], &self.meanings);
            let columns = view.export_columns();
            let row: Vec<String> = view
                .sections
                .iter()
                .flat_map(|s| s.fields.iter().map(|f| f.value.clone()))
                .collect();
            self.export = Some(ExportSet::new(columns, vec![row]));
            return RenderOutput::Form(view);
        }

        let view = TableView::from_records(&records);
        self.export = Some(ExportSet::new(view.columns.clone(), view.rows.clone()));
        self.plot = plot::derive(&records);
        RenderOutput::Table(view)
    }

    /// No recognized JSON shape: try the raw body as XML, then as delimited
    /// text, before giving up and displaying it verbatim.
    fn render_unrecognized(&mut self, method_code: &str, payload: &Value) -> RenderOutput {
        if let Some(raw) = self.raw_text.clone() {
            if let Some(records) = xml::records_from_xml(&raw) {
                return self.render_record_list(method_code, records);
            }
            if let Some(records) = text::parse_delimited(&raw) {
                return self.render_record_list(method_code, records);
            }
            return RenderOutput::Raw { text: raw };
        }
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        RenderOutput::Raw { text }
    }

    /// Encode the retained export as CSV for the current dashboard
    pub fn csv(&self) -> Result<Option<String>, ExportError> {
        match &self.export {
            Some(set) => Ok(Some(set.to_csv(self.dashboard)?)),
            None => Ok(None),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard
    }

    pub fn export(&self) -> Option<&ExportSet> {
        self.export.as_ref()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn plot(&self) -> Option<&PlotSet> {
        self.plot.as_ref()
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}
