//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use presence_core::config::AppConfig;
use presence_realtime::PresenceEngine;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Snapshot store, query facade and subscriptions
    pub engine: PresenceEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, engine: PresenceEngine) -> Self {
        Self {
            config,
            engine,
            started_at: Instant::now(),
        }
    }
}
