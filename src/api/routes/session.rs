//! Session Routes
//!
//! Operator login and logout.
//!
//! - POST /api/v1/auth/login - Exchange credentials for a session token
//! - POST /api/v1/auth/logout - Revoke the current token
//! - GET /api/v1/auth/me - Current session details

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::api::auth::{bearer_token, require_session};
use crate::api::dto::{LoginRequest, LoginResponse, SessionResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// POST /api/v1/auth/login
///
/// Verifies the operator credentials and issues a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth = &state.config.auth;
    if req.username != auth.admin_user || req.password != auth.admin_password {
        // Same answer for wrong user and wrong password
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.sessions.issue(&req.username).await;
    tracing::info!(username = %req.username, "Operator logged in");

    Ok(Json(LoginResponse {
        token,
        username: req.username,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token).await;
    }
    Ok(Json(serde_json::json!({"status": "ok"})))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let username = require_session(&state.sessions, &headers).await?;
    Ok(Json(SessionResponse { username }))
}
