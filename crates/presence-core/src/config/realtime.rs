//! Streaming subscriber and ingest pipeline configuration.

use serde::{Deserialize, Serialize};

/// Real-time fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-subscriber outbound buffer. A subscriber whose buffer fills up is dropped.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer_size: usize,
    /// Capacity of the inbound gateway → pipeline queue.
    #[serde(default = "default_ingest_buffer")]
    pub ingest_buffer_size: usize,
    /// SSE keep-alive comment interval in seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer_size: default_subscriber_buffer(),
            ingest_buffer_size: default_ingest_buffer(),
            keep_alive_seconds: default_keep_alive(),
        }
    }
}

fn default_subscriber_buffer() -> usize {
    64
}

fn default_ingest_buffer() -> usize {
    1024
}

fn default_keep_alive() -> u64 {
    15
}
