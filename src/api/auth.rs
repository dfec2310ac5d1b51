//! Session Tokens
//!
//! Bearer-token sessions for the operator login. Tokens are random UUIDs
//! held in memory; restarting the server logs everyone out, which is
//! acceptable for a small operations console.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use tokio::sync::Mutex;

use super::error::{ApiError, ApiResult};

/// In-memory session token store
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for a logged-in user
    pub async fn issue(&self, username: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .await
            .insert(token.clone(), username.to_string());
        token
    }

    /// Resolve a token to its username
    pub async fn verify(&self, token: &str) -> Option<String> {
        self.sessions.lock().await.get(token).cloned()
    }

    /// Drop a session; returns whether the token existed
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Extract a bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Gate a handler behind the login session, honoring the `require_auth`
/// config switch
pub async fn authorize(state: &super::state::AppState, headers: &HeaderMap) -> ApiResult<()> {
    if state.config.api.require_auth {
        require_session(&state.sessions, headers).await?;
    }
    Ok(())
}

/// Verify the request carries a valid session token
pub async fn require_session(store: &SessionStore, headers: &HeaderMap) -> ApiResult<String> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
    store
        .verify(token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("invalid or expired session".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_issue_verify_revoke() {
        let store = SessionStore::new();
        let token = store.issue("admin").await;

        assert_eq!(store.verify(&token).await.as_deref(), Some("admin"));
        assert!(store.revoke(&token).await);
        assert_eq!(store.verify(&token).await, None);
        assert!(!store.revoke(&token).await);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_require_session_rejects_unknown_token() {
        let store = SessionStore::new();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"));

        assert!(require_session(&store, &headers).await.is_err());
    }
}
