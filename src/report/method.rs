//! Report method catalogue
//!
//! Every request names a report method: either a reading (CIR7, S01, the
//! curve and closure reports) or a relay order (B03, and its bulk variant).
//! The catalogue drives request validation and dashboard grouping; the two
//! single-reading methods additionally select the key/value form rendering.

use serde::Serialize;

use super::error::{ReportError, ReportResult};

/// Methods whose single-record response renders as a labeled form
pub const FORM_METHODS: [&str; 2] = ["CIR7", "S01"];

/// One entry in the report method catalogue
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportMethod {
    /// Method code sent upstream (e.g. "S02")
    pub code: &'static str,
    /// Human label shown in dashboards
    pub label: &'static str,
    /// Whether the method queries a fini/fend time range
    pub needs_range: bool,
    /// Relay order rather than a reading
    pub is_order: bool,
    /// Only offered on the technical dashboard
    pub technical: bool,
}

impl ReportMethod {
    const fn reading(code: &'static str, label: &'static str, needs_range: bool) -> Self {
        Self {
            code,
            label,
            needs_range,
            is_order: false,
            technical: false,
        }
    }

    const fn technical(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            needs_range: true,
            is_order: false,
            technical: true,
        }
    }

    const fn order(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            needs_range: false,
            is_order: true,
            technical: false,
        }
    }
}

/// The full catalogue, in dashboard display order
pub fn catalogue() -> &'static [ReportMethod] {
    const METHODS: &[ReportMethod] = &[
        ReportMethod::order("B03", "Cut / reconnection"),
        ReportMethod::order("B03M", "Bulk cut / reconnection (file)"),
        ReportMethod::reading("CIR7", "Meter details", false),
        ReportMethod::reading("S01", "Instantaneous values", false),
        ReportMethod::reading("S02", "Hourly curve", true),
        ReportMethod::reading("S2B", "Active profile hourly curve", true),
        ReportMethod::reading("S03", "Daily curve", true),
        ReportMethod::reading("S04", "Monthly closure", true),
        ReportMethod::reading("S4E", "Monthly closure with surplus", true),
        ReportMethod::technical("S05", "Reactive hourly curve"),
        ReportMethod::technical("S5B", "Reactive hourly curve (profile)"),
        ReportMethod::technical("S06", "Reactive daily curve"),
        ReportMethod::technical("S07", "Reactive monthly closure"),
        ReportMethod::technical("S08", "Reactive monthly closure (surplus)"),
        ReportMethod::technical("S09", "Load profile"),
        ReportMethod::technical("S9B", "Load profile (B)"),
        ReportMethod::technical("S9C", "Load profile (C)"),
        ReportMethod::technical("S14", "Events"),
        ReportMethod::technical("S14A", "Events (A)"),
        ReportMethod::technical("S21", "Quality"),
        ReportMethod::technical("S21A", "Quality (A)"),
        ReportMethod::technical("S23", "Alarms"),
    ];
    METHODS
}

/// Look up a method by code
pub fn find(code: &str) -> Option<&'static ReportMethod> {
    catalogue().iter().find(|m| m.code == code)
}

/// Whether this method's single-record response renders as a form
pub fn is_form_method(code: &str) -> bool {
    FORM_METHODS.contains(&code)
}

/// Validate a report request against the catalogue
pub fn validate_report(
    code: &str,
    meter: &str,
    fini: Option<&str>,
    fend: Option<&str>,
) -> ReportResult<&'static ReportMethod> {
    let method = find(code).ok_or_else(|| ReportError::UnknownMethod(code.to_string()))?;
    if meter.trim().is_empty() {
        return Err(ReportError::MissingMeter);
    }
    if method.needs_range && (blank(fini) || blank(fend)) {
        return Err(ReportError::MissingDateRange(code.to_string()));
    }
    Ok(method)
}

/// Validate an order request: orders always need an activation date
pub fn validate_order(code: &str, meter: &str, actdate: Option<&str>) -> ReportResult<&'static ReportMethod> {
    let method = find(code).ok_or_else(|| ReportError::UnknownMethod(code.to_string()))?;
    if meter.trim().is_empty() {
        return Err(ReportError::MissingMeter);
    }
    if blank(actdate) {
        return Err(ReportError::MissingActivationDate(code.to_string()));
    }
    Ok(method)
}

fn blank(v: Option<&str>) -> bool {
    v.map(|s| s.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_lookup() {
        assert!(find("S02").unwrap().needs_range);
        assert!(!find("CIR7").unwrap().needs_range);
        assert!(find("B03").unwrap().is_order);
        assert!(find("S23").unwrap().technical);
        assert!(find("S99").is_none());
    }

    #[test]
    fn test_form_methods() {
        assert!(is_form_method("CIR7"));
        assert!(is_form_method("S01"));
        assert!(!is_form_method("S02"));
    }

    #[test]
    fn test_validate_report_range_methods() {
        assert!(validate_report("S02", "141825620", Some("2026-01-01T00:00:00Z"), Some("2026-01-02T00:00:00Z")).is_ok());
        assert_eq!(
            validate_report("S02", "141825620", Some("2026-01-01T00:00:00Z"), None),
            Err(ReportError::MissingDateRange("S02".to_string()))
        );
        assert!(validate_report("S01", "141825620", None, None).is_ok());
    }

    #[test]
    fn test_validate_report_rejects_blank_meter() {
        assert_eq!(
            validate_report("S01", "  ", None, None),
            Err(ReportError::MissingMeter)
        );
    }

    #[test]
    fn test_validate_order_needs_activation_date() {
        assert!(validate_order("B03", "141825620", Some("2026-01-24T10:00:00Z")).is_ok());
        assert_eq!(
            validate_order("B03", "141825620", None),
            Err(ReportError::MissingActivationDate("B03".to_string()))
        );
    }
}
