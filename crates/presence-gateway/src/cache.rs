//! Known users, used to complete the partial user objects in presence payloads.

use dashmap::DashMap;

use presence_entity::RawUser;

/// User id → most complete user object seen so far.
#[derive(Debug, Default)]
pub struct UserCache {
    users: DashMap<String, RawUser>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `user`; fields it carries override what was cached.
    pub fn remember(&self, user: &RawUser) {
        let Some(id) = user.id.clone() else {
            return;
        };
        let mut merged = user.clone();
        if let Some(existing) = self.users.get(&id) {
            merged.fill_from(existing.value());
        }
        self.users.insert(id, merged);
    }

    /// Fills the gaps in `user` from the cache, then records the result.
    pub fn complete(&self, user: &mut RawUser) {
        let Some(id) = user.id.as_deref() else {
            return;
        };
        if let Some(known) = self.users.get(id) {
            user.fill_from(known.value());
        }
        self.remember(user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
