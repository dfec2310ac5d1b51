//! Export Routes
//!
//! Download endpoints backed by the last render.
//!
//! - GET /api/v1/export/csv - Displayed rows as CSV
//! - GET /api/v1/export/xml - Verbatim upstream response body

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::auth::authorize;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/export/csv
///
/// Serves exactly what the last render displayed: same columns, same order,
/// every field quoted. The delimiter and filename follow the dashboard the
/// render was for.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    authorize(&state, &headers).await?;

    let session = state.session.read().await;
    let csv = session
        .csv()?
        .ok_or_else(|| ApiError::NotFound("no rendered report to export".to_string()))?;

    Ok(download(
        csv,
        "text/csv; charset=utf-8",
        session.dashboard().csv_filename(),
    ))
}

/// GET /api/v1/export/xml
///
/// The raw response body the backend sent, untouched.
pub async fn export_xml(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    authorize(&state, &headers).await?;

    let session = state.session.read().await;
    let text = session
        .raw_text()
        .ok_or_else(|| ApiError::NotFound("no raw response body to export".to_string()))?
        .to_string();

    Ok(download(
        text,
        "application/xml; charset=utf-8",
        session.dashboard().xml_filename(),
    ))
}

fn download(body: String, content_type: &str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                &format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response()
}
