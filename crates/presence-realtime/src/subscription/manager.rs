//! Subscription manager: connect and disconnect of streaming subscribers.

use std::sync::Arc;

use tracing::{debug, info};

use presence_core::{AppError, AppResult};

use super::guard::{SubscriberStream, SubscriptionGuard};
use crate::broadcast::{Broadcaster, ChannelSink, StreamMessage, SubscriberHandle, SubscriberSink};

/// Registers and removes streaming subscribers on the [`Broadcaster`].
#[derive(Debug)]
pub struct SubscriptionManager {
    broadcaster: Arc<Broadcaster>,
    buffer_size: usize,
}

impl SubscriptionManager {
    /// Creates a manager; `buffer_size` bounds each channel-backed subscriber.
    pub fn new(broadcaster: Arc<Broadcaster>, buffer_size: usize) -> Self {
        Self {
            broadcaster,
            buffer_size,
        }
    }

    /// Confirms the connection through `sink`, then registers it.
    ///
    /// The confirmation is written before registration so it is always the
    /// first frame the subscriber sees.
    pub fn on_connect(&self, sink: Arc<dyn SubscriberSink>) -> AppResult<SubscriberHandle> {
        sink.deliver(StreamMessage::connected()).map_err(|e| {
            AppError::service_unavailable(format!("Subscriber rejected connection confirmation: {e}"))
        })?;

        let handle = self.broadcaster.register(sink);
        info!(subscriber = %handle, "Stream subscriber connected");
        Ok(handle)
    }

    /// Removes a subscriber. Repeated calls for the same handle are no-ops.
    pub fn on_disconnect(&self, handle: SubscriberHandle) {
        if self.broadcaster.deregister(handle) {
            info!(subscriber = %handle, "Stream subscriber disconnected");
        } else {
            debug!(subscriber = %handle, "Subscriber already removed");
        }
    }

    /// Opens a channel-backed subscription whose stream deregisters itself when dropped.
    pub fn subscribe(self: &Arc<Self>) -> AppResult<SubscriberStream> {
        let (sink, receiver) = ChannelSink::new(self.buffer_size);
        let handle = self.on_connect(Arc::new(sink))?;
        let guard = SubscriptionGuard::new(Arc::clone(self), handle);
        Ok(SubscriberStream::new(receiver, guard))
    }

    /// Number of active subscribers.
    pub fn active(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}
