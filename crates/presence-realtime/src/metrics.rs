//! Pipeline and fan-out counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Raw events taken off the ingest queue.
    pub events_received: AtomicU64,
    /// Events dropped by the normalizer (no user, bot account).
    pub events_dropped: AtomicU64,
    /// Snapshots stored and published.
    pub snapshots_published: AtomicU64,
    /// Individual subscriber deliveries.
    pub deliveries: AtomicU64,
    /// Subscribers that ever connected.
    pub subscribers_connected: AtomicU64,
    /// Subscribers removed after a failed delivery.
    pub subscribers_dropped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_published(&self, delivered: usize) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn subscriber_connected(&self) {
        self.subscribers_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn subscriber_dropped(&self) {
        self.subscribers_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            subscribers_connected: self.subscribers_connected.load(Ordering::Relaxed),
            subscribers_dropped: self.subscribers_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_dropped: u64,
    pub snapshots_published: u64,
    pub deliveries: u64,
    pub subscribers_connected: u64,
    pub subscribers_dropped: u64,
}
