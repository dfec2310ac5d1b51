//! Report and Order Routes
//!
//! The core of the console: run a report or order against the metering
//! backend and render the response.
//!
//! - POST /api/v1/reports - Run a report query and render the response
//! - POST /api/v1/orders - Send a relay order
//! - POST /api/v1/orders/batch - Bulk relay order from an uploaded meter list
//! - GET /api/v1/plot/max - Highest point across the current plot series

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::auth::authorize;
use crate::api::dto::{BatchOrderResponse, OrderRequest, RenderResponse, ReportRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::export::Dashboard;
use crate::plot::MaxPoint;
use crate::report::{classify, method, ReportEnvelope};
use crate::upstream::{batch_entry_ok, OrderQuery, ReportQuery};

/// POST /api/v1/reports
pub async fn run_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ReportRequest>,
) -> ApiResult<Json<RenderResponse>> {
    authorize(&state, &headers).await?;
    method::validate_report(
        &req.report_name,
        &req.meter,
        req.fini.as_deref(),
        req.fend.as_deref(),
    )?;

    let meanings = state.meanings().await;

    tracing::info!(meter = %req.meter, report = %req.report_name, "Running report");
    let query = ReportQuery {
        meter: req.meter,
        report_name: req.report_name.clone(),
        priority: req.priority,
        fini: req.fini,
        fend: req.fend,
        id_pet: req.id_pet,
    };
    let envelope = state.upstream.report(&query).await?;

    let mut session = state.session.write().await;
    session.set_meanings(meanings);
    let output = session.render(&req.report_name, &envelope, req.dashboard);

    Ok(Json(render_response(
        &envelope,
        &req.report_name,
        output,
        &session,
    )))
}

/// POST /api/v1/orders
pub async fn run_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<OrderRequest>,
) -> ApiResult<Json<RenderResponse>> {
    authorize(&state, &headers).await?;
    let parsed = method::validate_order(&req.order, &req.meter, req.actdate.as_deref())?;
    if !parsed.is_order {
        return Err(ApiError::Validation(format!(
            "{} is a report method, not an order",
            req.order
        )));
    }

    let meanings = state.meanings().await;

    tracing::info!(meter = %req.meter, order = %req.order, "Sending order");
    let query = OrderQuery {
        meter: req.meter,
        order: req.order.clone(),
        priority: req.priority,
        actdate: req.actdate.unwrap_or_default(),
        id_pet: req.id_pet,
    };
    let envelope = state.upstream.order(&query).await?;

    let mut session = state.session.write().await;
    session.set_meanings(meanings);
    let output = session.render(&req.order, &envelope, req.dashboard);

    Ok(Json(render_response(&envelope, &req.order, output, &session)))
}

/// POST /api/v1/orders/batch
///
/// Multipart upload: a `file` part with the meter list, plus `order` and
/// `actdate` text parts. The file is forwarded to the backend untouched;
/// the per-meter result list comes back rendered as a table with an
/// ok/failed tally.
pub async fn run_order_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<BatchOrderResponse>> {
    authorize(&state, &headers).await?;

    let mut file_name = "meters.csv".to_string();
    let mut file_data: Option<Vec<u8>> = None;
    let mut order = String::new();
    let mut actdate = String::new();
    let mut dashboard = Dashboard::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if let Some(n) = field.file_name() {
                    file_name = n.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                file_data = Some(bytes.to_vec());
            }
            "order" => {
                order = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
            }
            "actdate" => {
                actdate = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
            }
            "dashboard" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                if text == "technical" {
                    dashboard = Dashboard::Technical;
                }
            }
            _ => {}
        }
    }

    let file_data =
        file_data.ok_or_else(|| ApiError::Validation("missing meter list file".to_string()))?;
    let parsed = method::find(&order)
        .ok_or_else(|| ApiError::Validation(format!("unknown order method: {}", order)))?;
    if !parsed.is_order {
        return Err(ApiError::Validation(format!(
            "{} is a report method, not an order",
            order
        )));
    }
    if actdate.trim().is_empty() {
        return Err(ApiError::Validation(
            "activation date is required for orders".to_string(),
        ));
    }

    let meanings = state.meanings().await;

    tracing::info!(order = %order, file = %file_name, "Sending bulk order");
    let result = state
        .upstream
        .order_batch(&file_name, file_data, &order, &actdate)
        .await?;

    // The backend answers {"results": [...]}; tolerate a bare list too
    let entries: Vec<Value> = result
        .get("results")
        .and_then(Value::as_array)
        .or_else(|| result.as_array())
        .cloned()
        .unwrap_or_default();
    let total = entries.len();
    let succeeded = entries.iter().filter(|e| batch_entry_ok(e)).count();

    let mut session = state.session.write().await;
    session.set_meanings(meanings);
    let records = classify(Value::Array(entries))
        .into_records()
        .unwrap_or_default();
    let output = session.render_batch(&order, records, dashboard);

    Ok(Json(BatchOrderResponse {
        total,
        succeeded,
        failed: total - succeeded,
        output,
    }))
}

/// GET /api/v1/plot/max
///
/// Recomputed from the retained series on every call.
pub async fn plot_max(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<MaxPoint>> {
    authorize(&state, &headers).await?;

    let session = state.session.read().await;
    let max = session
        .plot()
        .and_then(|p| p.max_point())
        .ok_or_else(|| ApiError::NotFound("no plot to summarize".to_string()))?;
    Ok(Json(max))
}

fn render_response(
    envelope: &ReportEnvelope,
    requested: &str,
    output: crate::render::RenderOutput,
    session: &crate::render::RenderSession,
) -> RenderResponse {
    RenderResponse {
        ip: envelope.ip().map(str::to_string),
        report_name: envelope.report_name().unwrap_or(requested).to_string(),
        output,
        plot: session.plot().cloned(),
        csv_available: session.export().is_some(),
        xml_available: session.raw_text().is_some(),
    }
}
