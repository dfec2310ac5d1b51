//! Report payloads and their normalization
//!
//! The upstream metering backend answers report queries with loosely-typed
//! JSON: sometimes a list of records, sometimes a single record, sometimes a
//! matrix with a separate column list, sometimes only a raw XML or delimited
//! text body. This module turns whatever came back into a uniform record
//! list (or an explicit "unrecognized" verdict) so the render layer can pick
//! exactly one interpretation.
//!
//! - [`envelope`]: the response envelope and payload extraction cascade
//! - [`shape`]: tagged shape classification of the payload
//! - [`method`]: the report method catalogue and request validation
//! - [`xml`]: fallback conversion of XML report bodies to records
//! - [`text`]: fallback parsing of delimited text report bodies

pub mod envelope;
pub mod error;
pub mod method;
pub mod shape;
pub mod text;
pub mod xml;

pub use envelope::ReportEnvelope;
pub use error::{ReportError, ReportResult};
pub use method::{is_form_method, ReportMethod};
pub use shape::{classify, column_union, PayloadShape, Record};
