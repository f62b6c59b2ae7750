//! Response DTOs.

use serde::{Deserialize, Serialize};

use presence_realtime::MetricsSnapshot;

/// `{"message": "..."}` body used for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Users with a stored snapshot.
    pub snapshots: usize,
    /// Open stream subscribers.
    pub subscribers: usize,
    /// Pipeline counters.
    pub metrics: MetricsSnapshot,
}
