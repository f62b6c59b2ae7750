//! Top-level presence engine that ties the pipeline components together.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use presence_core::AppResult;
use presence_core::config::{NormalizerConfig, RealtimeConfig};
use presence_entity::RawPresenceEvent;

use crate::broadcast::Broadcaster;
use crate::ingest::IngestPipeline;
use crate::metrics::RealtimeMetrics;
use crate::normalizer::Normalizer;
use crate::query::QueryService;
use crate::store::SnapshotStore;
use crate::subscription::{SubscriberStream, SubscriptionManager};

/// Owns the shared state and exposes the pipeline's entry points.
#[derive(Clone)]
pub struct PresenceEngine {
    /// Latest snapshot per user.
    pub store: Arc<SnapshotStore>,
    /// Subscriber fan-out.
    pub broadcaster: Arc<Broadcaster>,
    /// Subscriber lifecycle.
    pub subscriptions: Arc<SubscriptionManager>,
    /// REST read facade.
    pub query: QueryService,
    /// Normalize → store → publish.
    pub pipeline: Arc<IngestPipeline>,
    /// Counters.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for PresenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceEngine")
            .field("snapshots", &self.store.len())
            .field("subscribers", &self.broadcaster.subscriber_count())
            .finish()
    }
}

impl PresenceEngine {
    /// Creates an engine with empty state.
    pub fn new(realtime: RealtimeConfig, normalizer: &NormalizerConfig) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let store = Arc::new(SnapshotStore::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&metrics)));
        let subscriptions = Arc::new(SubscriptionManager::new(
            Arc::clone(&broadcaster),
            realtime.subscriber_buffer_size,
        ));
        let query = QueryService::new(Arc::clone(&store));
        let pipeline = Arc::new(IngestPipeline::new(
            Normalizer::new(normalizer),
            Arc::clone(&store),
            Arc::clone(&broadcaster),
            Arc::clone(&metrics),
        ));

        info!("Presence engine initialized");

        Self {
            store,
            broadcaster,
            subscriptions,
            query,
            pipeline,
            metrics,
            config: realtime,
        }
    }

    /// Starts the ingest task and returns the sender the gateway pushes into.
    pub fn spawn_ingest(
        &self,
        shutdown: CancellationToken,
    ) -> (mpsc::Sender<RawPresenceEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(self.config.ingest_buffer_size.max(1));
        let pipeline = Arc::clone(&self.pipeline);
        let task = tokio::spawn(async move { pipeline.run(rx, shutdown).await });
        (tx, task)
    }

    /// Opens a new streaming subscription.
    pub fn subscribe(&self) -> AppResult<SubscriberStream> {
        self.subscriptions.subscribe()
    }

    /// Streaming settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Closes every subscriber stream.
    pub fn shutdown(&self) {
        info!("Shutting down presence engine");
        self.broadcaster.close_all();
    }
}

impl Default for PresenceEngine {
    fn default() -> Self {
        Self::new(RealtimeConfig::default(), &NormalizerConfig::default())
    }
}
