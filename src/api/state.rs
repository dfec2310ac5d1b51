//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OnceCell, RwLock};

use crate::api::auth::SessionStore;
use crate::config::Config;
use crate::meaning::MeaningMap;
use crate::render::RenderSession;
use crate::upstream::{UpstreamClient, UpstreamConfig, UpstreamError};

/// Shared application state for all handlers
pub struct AppState {
    /// Full service configuration
    pub config: Arc<Config>,
    /// Client for the metering backend
    pub upstream: Arc<UpstreamClient>,
    /// Field meaning table, fetched lazily once per process
    meanings: OnceCell<Arc<MeaningMap>>,
    /// The current render: output backing the export and plot endpoints
    pub session: RwLock<RenderSession>,
    /// Login session tokens
    pub sessions: SessionStore,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state from configuration; builds the upstream client
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(UpstreamConfig {
            base_url: config.upstream.base_url.clone(),
            timeout_secs: config.upstream.timeout_secs,
        })?;

        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            meanings: OnceCell::new(),
            session: RwLock::new(RenderSession::new()),
            sessions: SessionStore::new(),
            start_time: Instant::now(),
        })
    }

    /// The meaning table, fetching it on first use. A fetch failure caches
    /// an empty map: labels degrade to raw codes rather than failing every
    /// report for a cosmetic table.
    pub async fn meanings(&self) -> Arc<MeaningMap> {
        self.meanings
            .get_or_init(|| async {
                match self.upstream.meanings().await {
                    Ok(entries) => {
                        tracing::info!(count = entries.len(), "Loaded field meaning table");
                        Arc::new(MeaningMap::new(entries))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load field meanings, using codes only");
                        Arc::new(MeaningMap::empty())
                    }
                }
            })
            .await
            .clone()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.api.host, self.config.api.port)
    }
}
