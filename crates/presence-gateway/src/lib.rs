//! # presence-gateway
//!
//! Websocket client for the chat platform's real-time gateway. It owns the
//! connection lifecycle (hello, identify, heartbeat, resume, reconnect with
//! backoff) and forwards every presence change it sees into the ingest
//! channel as a [`RawPresenceEvent`](presence_entity::RawPresenceEvent).

pub mod cache;
pub mod client;
pub mod protocol;

pub use cache::UserCache;
pub use client::GatewayClient;
