//! Branding Route
//!
//! - GET /api/v1/brand - Header texts for the dashboards

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::BrandResponse;
use crate::api::state::AppState;

/// GET /api/v1/brand
pub async fn brand(State(state): State<Arc<AppState>>) -> Json<BrandResponse> {
    let branding = &state.config.branding;
    Json(BrandResponse {
        app_title: branding.app_title.clone(),
        app_subtitle: branding.app_subtitle.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
