//! RAII subscription handle and the stream transports read from.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::manager::SubscriptionManager;
use crate::broadcast::{StreamMessage, SubscriberHandle};

/// Deregisters its subscriber when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard {
    manager: Arc<SubscriptionManager>,
    handle: SubscriberHandle,
}

impl SubscriptionGuard {
    pub fn new(manager: Arc<SubscriptionManager>, handle: SubscriberHandle) -> Self {
        Self { manager, handle }
    }

    pub fn handle(&self) -> SubscriberHandle {
        self.handle
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.manager.on_disconnect(self.handle);
    }
}

/// The message stream of one subscriber.
///
/// Ends when the broadcaster drops the subscriber; dropping it releases
/// the subscription.
#[derive(Debug)]
pub struct SubscriberStream {
    receiver: mpsc::Receiver<StreamMessage>,
    guard: SubscriptionGuard,
}

impl SubscriberStream {
    pub fn new(receiver: mpsc::Receiver<StreamMessage>, guard: SubscriptionGuard) -> Self {
        Self { receiver, guard }
    }

    pub fn handle(&self) -> SubscriberHandle {
        self.guard.handle()
    }
}

impl Stream for SubscriberStream {
    type Item = StreamMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Broadcaster;
    use crate::metrics::RealtimeMetrics;
    use chrono::Utc;
    use futures::StreamExt;
    use presence_entity::{PresenceSnapshot, PresenceStatus};

    #[tokio::test]
    async fn test_stream_yields_confirmation_then_updates() {
        let broadcaster = Arc::new(Broadcaster::new(Arc::new(RealtimeMetrics::new())));
        let manager = Arc::new(SubscriptionManager::new(Arc::clone(&broadcaster), 8));
        let mut stream = manager.subscribe().unwrap();

        broadcaster.publish(Arc::new(PresenceSnapshot {
            user_id: "u1".to_string(),
            username: None,
            avatar_url: None,
            status: PresenceStatus::Online,
            activities: Vec::new(),
            updated_at: Utc::now(),
        }));

        let first = stream.next().await.unwrap();
        assert!(matches!(first, StreamMessage::Connected(_)));
        let second = stream.next().await.unwrap();
        assert_eq!(second.snapshot().unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_stream_ends_when_dropped_by_broadcaster() {
        let broadcaster = Arc::new(Broadcaster::new(Arc::new(RealtimeMetrics::new())));
        let manager = Arc::new(SubscriptionManager::new(Arc::clone(&broadcaster), 8));
        let mut stream = manager.subscribe().unwrap();

        broadcaster.close_all();

        assert!(matches!(stream.next().await, Some(StreamMessage::Connected(_))));
        assert!(stream.next().await.is_none());
    }
}
