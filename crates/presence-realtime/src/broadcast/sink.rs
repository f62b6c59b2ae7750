//! Transport-independent subscriber sinks.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use super::message::StreamMessage;

/// Why a delivery to a sink failed. Either way the subscriber is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The receiving side has gone away.
    #[error("subscriber sink is closed")]
    Closed,
    /// The subscriber is not keeping up.
    #[error("subscriber sink is full")]
    Full,
}

/// Something the broadcaster can push messages into.
///
/// Implementations must not block: a delivery either succeeds immediately
/// or fails.
pub trait SubscriberSink: Send + Sync + fmt::Debug {
    /// Attempts to hand `message` to the subscriber.
    fn deliver(&self, message: StreamMessage) -> Result<(), SinkError>;
}

/// A sink backed by a bounded tokio mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<StreamMessage>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the transport reads from.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<StreamMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl SubscriberSink for ChannelSink {
    fn deliver(&self, message: StreamMessage) -> Result<(), SinkError> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
