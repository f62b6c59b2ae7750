//! # presence-entity
//!
//! Domain models for the presence relay. The canonical types
//! ([`PresenceSnapshot`], [`ActivityRecord`]) are what the store holds and
//! what clients receive; the [`raw`] module mirrors the upstream gateway's
//! presence payload as loosely as possible so malformed fields degrade to
//! `None` instead of rejecting an event.

pub mod activity;
pub mod presence;
pub mod raw;

pub use activity::{ActivityAssets, ActivityRecord, ActivityType, MediaEnrichment};
pub use presence::{PresenceSnapshot, PresenceStatus};
pub use raw::{RawActivity, RawAssets, RawPresenceEvent, RawTimestamps, RawUser};
