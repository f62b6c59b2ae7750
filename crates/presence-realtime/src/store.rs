//! Latest-value snapshot store keyed by user id.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use presence_core::{AppError, AppResult};
use presence_entity::PresenceSnapshot;

/// Thread-safe map of user id → most recent snapshot.
///
/// Values are `Arc`-wrapped and replaced wholesale, so a reader either sees
/// the previous snapshot or the new one, never a partially written record.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: DashMap<String, Arc<PresenceSnapshot>>,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot for `user_id` (last write wins, no merge).
    ///
    /// `updated_at` never moves backwards for a user: if the incoming
    /// snapshot is older than the one it replaces, it inherits the newer
    /// timestamp.
    pub fn upsert(
        &self,
        user_id: impl Into<String>,
        mut snapshot: PresenceSnapshot,
    ) -> Arc<PresenceSnapshot> {
        match self.snapshots.entry(user_id.into()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get().updated_at;
                if snapshot.updated_at < previous {
                    snapshot.updated_at = previous;
                }
                let snapshot = Arc::new(snapshot);
                entry.insert(Arc::clone(&snapshot));
                snapshot
            }
            Entry::Vacant(entry) => {
                let snapshot = Arc::new(snapshot);
                entry.insert(Arc::clone(&snapshot));
                snapshot
            }
        }
    }

    /// Returns the latest snapshot for `user_id`.
    pub fn get(&self, user_id: &str) -> AppResult<Arc<PresenceSnapshot>> {
        self.snapshots
            .get(user_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Copies out every current snapshot, in no particular order.
    pub fn list(&self) -> Vec<Arc<PresenceSnapshot>> {
        self.snapshots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Number of users with a snapshot.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
