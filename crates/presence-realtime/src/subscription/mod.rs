//! Subscriber lifecycle, decoupled from the transport that opened the connection.

pub mod guard;
pub mod manager;

pub use guard::{SubscriberStream, SubscriptionGuard};
pub use manager::SubscriptionManager;
