//! Subscriber registry and snapshot fan-out.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use presence_entity::PresenceSnapshot;

use super::message::StreamMessage;
use super::sink::SubscriberSink;
use crate::metrics::RealtimeMetrics;

/// Opaque handle identifying one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle(Uuid);

impl SubscriberHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pushes every published snapshot to all registered subscribers.
///
/// Delivery is best-effort and non-blocking. A subscriber whose sink
/// rejects a message is removed; the others are unaffected. There is no
/// replay: a subscriber only sees what is published after it registered.
#[derive(Debug)]
pub struct Broadcaster {
    subscribers: DashMap<SubscriberHandle, Arc<dyn SubscriberSink>>,
    metrics: Arc<RealtimeMetrics>,
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    pub fn new(metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            subscribers: DashMap::new(),
            metrics,
        }
    }

    /// Adds a subscriber to the active set.
    pub fn register(&self, sink: Arc<dyn SubscriberSink>) -> SubscriberHandle {
        let handle = SubscriberHandle::new();
        self.subscribers.insert(handle, sink);
        self.metrics.subscriber_connected();
        debug!(subscriber = %handle, total = self.subscribers.len(), "Subscriber registered");
        handle
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn deregister(&self, handle: SubscriberHandle) -> bool {
        self.subscribers.remove(&handle).is_some()
    }

    /// Delivers `snapshot` to every subscriber and returns how many accepted it.
    pub fn publish(&self, snapshot: Arc<PresenceSnapshot>) -> usize {
        let message = StreamMessage::Snapshot(snapshot);
        let mut delivered = 0;
        let mut failed = Vec::new();

        for entry in self.subscribers.iter() {
            match entry.value().deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(reason) => failed.push((*entry.key(), reason)),
            }
        }

        for (handle, reason) in failed {
            if self.subscribers.remove(&handle).is_some() {
                self.metrics.subscriber_dropped();
                warn!(subscriber = %handle, reason = %reason, "Dropping subscriber after failed delivery");
            }
        }

        self.metrics.snapshot_published(delivered);
        delivered
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drops every subscriber, closing their streams.
    pub fn close_all(&self) {
        let count = self.subscribers.len();
        self.subscribers.clear();
        info!(count, "Closed all subscribers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::sink::{ChannelSink, SinkError};
    use chrono::Utc;
    use presence_entity::PresenceStatus;

    fn snapshot(user_id: &str) -> Arc<PresenceSnapshot> {
        Arc::new(PresenceSnapshot {
            user_id: user_id.to_string(),
            username: None,
            avatar_url: None,
            status: PresenceStatus::Online,
            activities: Vec::new(),
            updated_at: Utc::now(),
        })
    }

    fn user_ids(rx: &mut tokio::sync::mpsc::Receiver<StreamMessage>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let Some(snapshot) = message.snapshot() {
                ids.push(snapshot.user_id.clone());
            }
        }
        ids
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl SubscriberSink for BrokenSink {
        fn deliver(&self, _message: StreamMessage) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    #[test]
    fn test_publish_reaches_every_subscriber_in_order() {
        let broadcaster = Broadcaster::new(Arc::new(RealtimeMetrics::new()));
        let (a, mut rx_a) = ChannelSink::new(16);
        let (b, mut rx_b) = ChannelSink::new(16);
        broadcaster.register(Arc::new(a));
        broadcaster.register(Arc::new(b));

        for id in ["u1", "u2", "u1", "u3"] {
            assert_eq!(broadcaster.publish(snapshot(id)), 2);
        }

        assert_eq!(user_ids(&mut rx_a), vec!["u1", "u2", "u1", "u3"]);
        assert_eq!(user_ids(&mut rx_b), vec!["u1", "u2", "u1", "u3"]);
    }

    #[test]
    fn test_broken_subscriber_is_removed_others_still_receive() {
        let metrics = Arc::new(RealtimeMetrics::new());
        let broadcaster = Broadcaster::new(Arc::clone(&metrics));
        let (healthy, mut rx) = ChannelSink::new(16);
        broadcaster.register(Arc::new(healthy));
        broadcaster.register(Arc::new(BrokenSink));

        assert_eq!(broadcaster.publish(snapshot("u1")), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(broadcaster.publish(snapshot("u2")), 1);

        assert_eq!(user_ids(&mut rx), vec!["u1", "u2"]);
        assert_eq!(metrics.snapshot().subscribers_dropped, 1);
    }

    #[test]
    fn test_closed_receiver_is_removed() {
        let broadcaster = Broadcaster::new(Arc::new(RealtimeMetrics::new()));
        let (sink, rx) = ChannelSink::new(16);
        broadcaster.register(Arc::new(sink));
        drop(rx);

        assert_eq!(broadcaster.publish(snapshot("u1")), 0);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_slow_subscriber_is_dropped_not_awaited() {
        let broadcaster = Broadcaster::new(Arc::new(RealtimeMetrics::new()));
        let (slow, _slow_rx) = ChannelSink::new(1);
        let (fast, mut fast_rx) = ChannelSink::new(16);
        broadcaster.register(Arc::new(slow));
        broadcaster.register(Arc::new(fast));

        broadcaster.publish(snapshot("u1"));
        broadcaster.publish(snapshot("u2"));

        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(user_ids(&mut fast_rx), vec!["u1", "u2"]);
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let broadcaster = Broadcaster::new(Arc::new(RealtimeMetrics::new()));
        broadcaster.publish(snapshot("u1"));
        broadcaster.publish(snapshot("u2"));

        let (late, mut rx) = ChannelSink::new(16);
        broadcaster.register(Arc::new(late));
        broadcaster.publish(snapshot("u3"));

        assert_eq!(user_ids(&mut rx), vec!["u3"]);
    }

    #[test]
    fn test_deregister_twice_is_noop() {
        let broadcaster = Broadcaster::new(Arc::new(RealtimeMetrics::new()));
        let (sink, _rx) = ChannelSink::new(4);
        let handle = broadcaster.register(Arc::new(sink));

        assert!(broadcaster.deregister(handle));
        assert!(!broadcaster.deregister(handle));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
