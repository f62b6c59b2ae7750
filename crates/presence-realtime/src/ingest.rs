//! Gateway → store → subscribers.
//!
//! The gateway pushes raw events into a bounded channel; a single
//! [`IngestPipeline`] task drains it in arrival order.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use presence_core::AppResult;
use presence_entity::{PresenceSnapshot, RawPresenceEvent};

use crate::broadcast::Broadcaster;
use crate::metrics::RealtimeMetrics;
use crate::normalizer::Normalizer;
use crate::store::SnapshotStore;

/// A producer of raw presence events, e.g. a gateway connection.
///
/// Implementations own their connection lifecycle (connect, authenticate,
/// reconnect) and return when `shutdown` fires or on a fatal error.
#[async_trait]
pub trait PresenceSource: Send {
    async fn run(
        &mut self,
        events: mpsc::Sender<RawPresenceEvent>,
        shutdown: CancellationToken,
    ) -> AppResult<()>;
}

/// Normalizes, stores and publishes raw presence events.
#[derive(Debug)]
pub struct IngestPipeline {
    normalizer: Normalizer,
    store: Arc<SnapshotStore>,
    broadcaster: Arc<Broadcaster>,
    metrics: Arc<RealtimeMetrics>,
}

impl IngestPipeline {
    pub fn new(
        normalizer: Normalizer,
        store: Arc<SnapshotStore>,
        broadcaster: Arc<Broadcaster>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            normalizer,
            store,
            broadcaster,
            metrics,
        }
    }

    /// Handles one event. Returns the stored snapshot, or `None` if the event was dropped.
    pub fn process(&self, raw: RawPresenceEvent) -> Option<Arc<PresenceSnapshot>> {
        self.metrics.event_received();

        let Some(snapshot) = self.normalizer.normalize(raw) else {
            self.metrics.event_dropped();
            return None;
        };

        let user_id = snapshot.user_id.clone();
        let stored = self.store.upsert(user_id, snapshot);
        let delivered = self.broadcaster.publish(Arc::clone(&stored));

        debug!(
            user_id = %stored.user_id,
            username = stored.username.as_deref().unwrap_or("-"),
            status = %stored.status,
            delivered,
            "Presence update"
        );

        Some(stored)
    }

    /// Drains `events` until the channel closes or `shutdown` fires.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<RawPresenceEvent>,
        shutdown: CancellationToken,
    ) {
        info!("Presence ingest started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(raw) => {
                        self.process(raw);
                    }
                    None => break,
                },
            }
        }
        info!("Presence ingest stopped");
    }
}
