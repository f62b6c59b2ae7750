//! Read-only facade over the snapshot store.

use std::sync::Arc;

use presence_core::AppResult;
use presence_entity::PresenceSnapshot;

use crate::store::SnapshotStore;

/// Point-in-time presence lookups. Never touches the event path.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<SnapshotStore>,
}

impl QueryService {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// All current snapshots, ordered by user id.
    pub fn list_all(&self) -> Vec<Arc<PresenceSnapshot>> {
        let mut snapshots = self.store.list();
        snapshots.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        snapshots
    }

    /// The latest snapshot for `user_id`, or a not-found error.
    pub fn get_by_user(&self, user_id: &str) -> AppResult<Arc<PresenceSnapshot>> {
        self.store.get(user_id)
    }
}
