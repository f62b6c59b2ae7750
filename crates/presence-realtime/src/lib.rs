//! # presence-realtime
//!
//! The presence event pipeline. Provides:
//!
//! - Normalization of raw gateway presence events into [`PresenceSnapshot`]s
//! - A latest-value snapshot store keyed by user id
//! - Fan-out of accepted snapshots to streaming subscribers
//! - Subscriber lifecycle management independent of the transport
//! - A read-only query facade for point-in-time lookups
//!
//! [`PresenceSnapshot`]: presence_entity::PresenceSnapshot

pub mod broadcast;
pub mod engine;
pub mod ingest;
pub mod metrics;
pub mod normalizer;
pub mod query;
pub mod store;
pub mod subscription;

pub use broadcast::{Broadcaster, ChannelSink, SinkError, StreamMessage, SubscriberHandle, SubscriberSink};
pub use engine::PresenceEngine;
pub use ingest::{IngestPipeline, PresenceSource};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use normalizer::Normalizer;
pub use query::QueryService;
pub use store::SnapshotStore;
pub use subscription::{SubscriberStream, SubscriptionGuard, SubscriptionManager};
