//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::export::Dashboard;
use crate::plot::PlotSet;
use crate::render::RenderOutput;

// ============================================
// AUTH DTOs
// ============================================

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with the issued session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Current session details
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
}

// ============================================
// REPORT AND ORDER DTOs
// ============================================

/// Report query request
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// Meter or concentrator identifier
    pub meter: String,
    /// Report method code (e.g. "S02")
    pub report_name: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Range start, required for curve/closure methods
    #[serde(default)]
    pub fini: Option<String>,
    /// Range end, required for curve/closure methods
    #[serde(default)]
    pub fend: Option<String>,
    /// Which dashboard is asking; selects the export delimiter
    #[serde(default)]
    pub dashboard: Dashboard,
    /// Optional petition id passed through to the backend
    #[serde(default)]
    pub id_pet: Option<String>,
}

fn default_priority() -> u8 {
    2
}

/// Relay order request
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub meter: String,
    /// Order method code (e.g. "B03")
    pub order: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Activation date for the relay order
    #[serde(default)]
    pub actdate: Option<String>,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default)]
    pub id_pet: Option<String>,
}

/// Response for a rendered report or order
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    /// Concentrator address the response came from, when reported
    pub ip: Option<String>,
    /// Method code echoed by the backend, or the requested one
    pub report_name: String,
    pub output: RenderOutput,
    /// Derived plot series, table mode only
    pub plot: Option<PlotSet>,
    /// Whether GET /export/csv will serve a download right now
    pub csv_available: bool,
    /// Whether GET /export/xml will serve a download right now
    pub xml_available: bool,
}

/// Bulk order result summary
#[derive(Debug, Serialize)]
pub struct BatchOrderResponse {
    /// Meters in the backend's result list
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output: RenderOutput,
}

// ============================================
// CATALOGUE DTOs
// ============================================

/// Field meaning table
#[derive(Debug, Serialize)]
pub struct MeaningsResponse {
    pub count: usize,
    pub entries: HashMap<String, String>,
}

// ============================================
// BRANDING AND HEALTH DTOs
// ============================================

/// Dashboard header texts
#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub app_title: String,
    pub app_subtitle: String,
    pub version: String,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream: String,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_request_defaults() {
        let req: ReportRequest =
            serde_json::from_str(r#"{"meter": "CIR0141825620", "report_name": "S01"}"#).unwrap();
        assert_eq!(req.priority, 2);
        assert_eq!(req.dashboard, Dashboard::Meters);
        assert!(req.fini.is_none());
    }

    #[test]
    fn test_dashboard_parses_lowercase() {
        let req: ReportRequest = serde_json::from_str(
            r#"{"meter": "x", "report_name": "S02", "dashboard": "technical"}"#,
        )
        .unwrap();
        assert_eq!(req.dashboard, Dashboard::Technical);
    }
}
