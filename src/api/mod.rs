//! Telegrid REST API
//!
//! HTTP API layer for the report console, built with Axum.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/v1/auth/login` - Exchange credentials for a session token
//! - `POST /api/v1/auth/logout` - Revoke the current token
//! - `GET /api/v1/auth/me` - Current session details
//!
//! ## Reports and orders
//! - `POST /api/v1/reports` - Run a report query and render the response
//! - `POST /api/v1/orders` - Send a relay order
//! - `POST /api/v1/orders/batch` - Bulk relay order from an uploaded file
//! - `GET /api/v1/plot/max` - Highest point across the current plot series
//!
//! ## Export
//! - `GET /api/v1/export/csv` - Displayed rows as CSV
//! - `GET /api/v1/export/xml` - Verbatim upstream response body
//!
//! ## Catalogue
//! - `GET /api/v1/methods` - The report method catalogue
//! - `GET /api/v1/meanings` - The field code meaning table
//! - `GET /api/v1/brand` - Header texts for the dashboards
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
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

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/login", post(routes::session::login))
        .route("/auth/logout", post(routes::session::logout))
        .route("/auth/me", get(routes::session::me))
        // Report and order routes
        .route("/reports", post(routes::reports::run_report))
        .route("/orders", post(routes::reports::run_order))
        // Bulk orders only get the larger limit for the uploaded meter list
        .route(
            "/orders/batch",
            post(routes::reports::run_order_batch)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        // Plot routes
        .route("/plot/max", get(routes::reports::plot_max))
        // Export routes
        .route("/export/csv", get(routes::export::export_csv))
        .route("/export/xml", get(routes::export::export_xml))
        // Catalogue routes
        .route("/methods", get(routes::catalog::list_methods))
        .route("/meanings", get(routes::catalog::list_meanings))
        .route("/brand", get(routes::brand::brand));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Telegrid API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Telegrid API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn test_config(require_auth: bool) -> Config {
        let mut config = Config::default();
        // Nothing listens here; routes under test never reach the backend
        config.upstream.base_url = "http://127.0.0.1:9".to_string();
        config.upstream.timeout_secs = 1;
        config.api.require_auth = require_auth;
        config.auth.admin_password = "secret".to_string();
        config
    }

    fn create_test_app(require_auth: bool) -> Router {
        let state = AppState::new(test_config(require_auth)).unwrap();
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_brand() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/brand")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["app_title"], "Telegrid");
    }

    #[tokio::test]
    async fn test_method_catalogue() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/methods")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let codes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["code"].as_str().unwrap())
            .collect();
        assert!(codes.contains(&"S02"));
        assert!(codes.contains(&"B03"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = create_test_app(true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"username": "admin", "password": "wrong"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let app = create_test_app(true);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"username": "admin", "password": "secret"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/me")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], "admin");
    }

    #[tokio::test]
    async fn test_reports_require_session() {
        let app = create_test_app(true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"meter": "x", "report_name": "S01"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_report_unknown_method_is_rejected() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"meter": "x", "report_name": "S99"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_report_missing_range_is_rejected() {
        let app = create_test_app(false);

        // S02 is a curve method; fini/fend are mandatory
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"meter": "x", "report_name": "S02"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_body_limit_is_not_raised() {
        let app = create_test_app(false);

        // Only /orders/batch accepts multi-megabyte uploads; a 3 MB report
        // body must still hit the default limit
        let oversized = format!(
            r#"{{"meter": "x", "report_name": "S01", "id_pet": "{}"}}"#,
            "x".repeat(3 * 1024 * 1024)
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports")
                    .header("Content-Type", "application/json")
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_export_csv_without_render_is_not_found() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/export/csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plot_max_without_render_is_not_found() {
        let app = create_test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/plot/max")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
