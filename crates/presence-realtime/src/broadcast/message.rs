//! Messages delivered to streaming subscribers.

use std::sync::Arc;

use serde::Serialize;

use presence_core::AppResult;
use presence_entity::PresenceSnapshot;

/// Body of the confirmation sent when a subscriber connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionAck {
    pub message: &'static str,
}

/// One frame on a subscriber's stream.
///
/// Serializes without a tag: `{"message":"connected"}` for the
/// confirmation, the snapshot object itself for updates.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Connected(ConnectionAck),
    Snapshot(Arc<PresenceSnapshot>),
}

impl StreamMessage {
    /// The connection confirmation.
    pub fn connected() -> Self {
        Self::Connected(ConnectionAck {
            message: "connected",
        })
    }

    /// Serializes the frame payload as JSON.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The carried snapshot, if this is an update.
    pub fn snapshot(&self) -> Option<&PresenceSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::Connected(_) => None,
        }
    }
}
