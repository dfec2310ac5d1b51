//! Catalogue Routes
//!
//! Static and semi-static lookup data the dashboards build their controls
//! from.
//!
//! - GET /api/v1/methods - The report method catalogue
//! - GET /api/v1/meanings - The field code meaning table

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::MeaningsResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::method::{self, ReportMethod};

/// GET /api/v1/methods
pub async fn list_methods() -> Json<&'static [ReportMethod]> {
    Json(method::catalogue())
}

/// GET /api/v1/meanings
///
/// Fetched from the backend on first call and cached for the process
/// lifetime; a backend failure yields an empty table, not an error.
pub async fn list_meanings(State(state): State<Arc<AppState>>) -> ApiResult<Json<MeaningsResponse>> {
    let meanings = state.meanings().await;
    Ok(Json(MeaningsResponse {
        count: meanings.len(),
        entries: meanings.entries().clone(),
    }))
}
