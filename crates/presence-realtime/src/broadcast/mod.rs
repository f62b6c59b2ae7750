//! Fan-out of published snapshots to streaming subscribers.

pub mod broadcaster;
pub mod message;
pub mod sink;

pub use broadcaster::{Broadcaster, SubscriberHandle};
pub use message::StreamMessage;
pub use sink::{ChannelSink, SinkError, SubscriberSink};
