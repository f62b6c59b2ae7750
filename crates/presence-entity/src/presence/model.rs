//! Latest-known presence record for one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PresenceStatus;
use crate::activity::{ActivityRecord, MediaEnrichment};

/// The latest presence state of a single user.
///
/// A new snapshot for the same user replaces the previous one wholesale;
/// fields are never merged across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    /// Platform user id; the store key.
    pub user_id: String,
    /// Username, when the gateway knew it.
    pub username: Option<String>,
    /// Absolute avatar URL.
    pub avatar_url: Option<String>,
    /// Online status.
    pub status: PresenceStatus,
    /// Activities in the order the platform reported them.
    pub activities: Vec<ActivityRecord>,
    /// When this snapshot was normalized.
    pub updated_at: DateTime<Utc>,
}

impl PresenceSnapshot {
    /// Media enrichment of the first activity that carries one.
    pub fn media(&self) -> Option<&MediaEnrichment> {
        self.activities.iter().find_map(|a| a.media.as_ref())
    }
}
