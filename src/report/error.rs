//! Report request errors
//!
//! Validation failures raised before a request is sent upstream.

use thiserror::Error;

/// Errors raised while validating a report or order request
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    /// The requested report method is not in the catalogue
    #[error("Unknown report method: {0}")]
    UnknownMethod(String),

    /// The method queries a time range but fini/fend were not both given
    #[error("Method {0} requires both a start and an end date")]
    MissingDateRange(String),

    /// An order method was submitted without an activation date
    #[error("Order {0} requires an activation date")]
    MissingActivationDate(String),

    /// No meter identifier was supplied
    #[error("A meter identifier is required")]
    MissingMeter,
}

/// Result type for report validation
pub type ReportResult<T> = Result<T, ReportError>;
