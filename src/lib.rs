//! # Telegrid
//!
//! Meter telemetry console - a web service that runs report queries and
//! relay orders against a metering backend, then normalizes, renders, and
//! exports whatever the concentrators answer.
//!
//! ## Features
//!
//! - **Shape normalization**: loosely-typed report payloads become uniform
//!   record lists, with XML and delimited-text fallbacks
//! - **Rendering**: table, single-record form, no-data, or raw display,
//!   exactly one interpretation per response
//! - **Exports**: CSV of what was displayed, XML of what was received
//! - **Plots**: numeric columns become time series with a maximum overlay
//! - **Meanings**: terse field codes labeled from an upstream lookup table
//!
//! ## Modules
//!
//! - [`report`]: payload shapes, the method catalogue, and parse fallbacks
//! - [`render`]: the render pipeline and per-render session state
//! - [`plot`]: plot series derivation
//! - [`export`]: CSV/XML download encoding
//! - [`meaning`]: field code meaning lookup
//! - [`upstream`]: client for the metering backend
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use telegrid::api::{serve, AppState};
//! use telegrid::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let state = AppState::new(config)?;
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod meaning;
pub mod plot;
pub mod render;
pub mod report;
pub mod upstream;

// Re-export top-level types for convenience
pub use report::{
    classify, column_union, PayloadShape, Record, ReportEnvelope, ReportError, ReportMethod,
    ReportResult,
};

pub use render::{FormView, RenderOutput, RenderSession, TableView};

pub use export::{Dashboard, ExportError, ExportSet};

pub use plot::{MaxPoint, PlotSeries, PlotSet};

pub use meaning::MeaningMap;

pub use upstream::{OrderQuery, ReportQuery, UpstreamClient, UpstreamConfig, UpstreamError};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
