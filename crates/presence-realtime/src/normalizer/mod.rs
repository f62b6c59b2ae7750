//! Raw gateway presence → canonical [`PresenceSnapshot`].
//!
//! The normalizer is a pure transform: it never fails, it only drops
//! events that have no user or come from bot accounts. Missing or
//! malformed optional fields become `None`.

pub mod avatar;
pub mod image;
pub mod media;

use chrono::{DateTime, Utc};

use presence_core::config::NormalizerConfig;
use presence_entity::{
    ActivityAssets, ActivityRecord, ActivityType, PresenceSnapshot, PresenceStatus, RawActivity,
    RawPresenceEvent,
};

use self::image::ImageResolver;
use self::media::MediaMatcher;

/// Converts raw presence events into snapshots.
#[derive(Debug, Clone)]
pub struct Normalizer {
    images: ImageResolver,
    media: MediaMatcher,
    cdn_host: String,
    avatar_size: u32,
}

impl Normalizer {
    /// Creates a normalizer from configuration.
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            images: ImageResolver::new(&config.cdn_host, &config.media_host),
            media: MediaMatcher::new(config.media_integration.clone()),
            cdn_host: config.cdn_host.clone(),
            avatar_size: config.avatar_size,
        }
    }

    /// Normalizes `raw`, stamping it with the current time.
    pub fn normalize(&self, raw: RawPresenceEvent) -> Option<PresenceSnapshot> {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalizes `raw` with an explicit `updated_at`.
    ///
    /// Returns `None` when the event has no user id or the user is a bot.
    pub fn normalize_at(
        &self,
        raw: RawPresenceEvent,
        updated_at: DateTime<Utc>,
    ) -> Option<PresenceSnapshot> {
        let user = raw.user?;
        if user.is_bot() {
            return None;
        }
        let user_id = user.id.clone().filter(|id| !id.is_empty())?;

        let avatar_url = avatar::avatar_url(&self.cdn_host, &user, self.avatar_size);
        let status = raw
            .status
            .as_deref()
            .map(PresenceStatus::from_str_or_offline)
            .unwrap_or(PresenceStatus::Offline);
        let activities = raw
            .activities
            .iter()
            .map(|a| self.normalize_activity(a))
            .collect();

        Some(PresenceSnapshot {
            user_id,
            username: user.username,
            avatar_url,
            status,
            activities,
            updated_at,
        })
    }

    /// Normalizes a single activity, attaching media enrichment when it matches.
    pub fn normalize_activity(&self, activity: &RawActivity) -> ActivityRecord {
        let app_id = activity.application_id.as_deref();
        let raw_assets = activity.assets.clone().unwrap_or_default();

        let large_image_url = self.images.resolve(app_id, raw_assets.large_image.as_deref());
        let small_image_url = self.images.resolve(app_id, raw_assets.small_image.as_deref());
        let media = self.media.extract(activity, large_image_url.clone());

        ActivityRecord {
            name: activity.name.clone(),
            kind: activity.kind.and_then(ActivityType::from_code),
            details: activity.details.clone(),
            state: activity.state.clone(),
            platform: activity.platform.clone(),
            started_at: activity
                .timestamps
                .as_ref()
                .and_then(|t| t.start)
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            assets: ActivityAssets {
                large_image_url,
                small_image_url,
                large_text: raw_assets.large_text,
                small_text: raw_assets.small_text,
                enriched_media_art_url: media.as_ref().and_then(|m| m.art_url.clone()),
            },
            media,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPresenceEvent {
        serde_json::from_value(value).expect("raw event")
    }

    #[test]
    fn test_drops_event_without_user() {
        let normalizer = Normalizer::default();
        assert!(normalizer.normalize(raw(json!({ "status": "online" }))).is_none());
        assert!(
            normalizer
                .normalize(raw(json!({ "user": { "username": "ghost" } })))
                .is_none()
        );
    }

    #[test]
    fn test_drops_bot_accounts() {
        let normalizer = Normalizer::default();
        let event = raw(json!({ "user": { "id": "1", "bot": true }, "status": "online" }));
        assert!(normalizer.normalize(event).is_none());
    }

    #[test]
    fn test_media_example_event() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1", "username": "nelly" },
            "status": "online",
            "activities": [{
                "name": "Spotify",
                "details": "Song A",
                "state": "Artist A",
                "assets": { "large_text": "Album A", "large_image": "spotify:abc" }
            }]
        }));

        let snapshot = normalizer.normalize(event).unwrap();
        assert_eq!(snapshot.user_id, "u1");
        assert_eq!(snapshot.status, PresenceStatus::Online);

        let activity = &snapshot.activities[0];
        // No application id and not proxied media: resolves to nothing.
        assert_eq!(activity.assets.large_image_url, None);
        assert_eq!(activity.assets.enriched_media_art_url, None);
        assert_eq!(activity.assets.large_text.as_deref(), Some("Album A"));
        assert_eq!(activity.kind, None);
        assert_eq!(activity.platform, None);
        assert_eq!(activity.started_at, None);

        let media = activity.media.as_ref().unwrap();
        assert_eq!(media.song.as_deref(), Some("Song A"));
        assert_eq!(media.artist.as_deref(), Some("Artist A"));
        assert_eq!(media.album.as_deref(), Some("Album A"));
    }

    #[test]
    fn test_media_art_follows_image_resolution() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1" },
            "activities": [{
                "name": "Spotify",
                "type": 2,
                "application_id": "42",
                "assets": { "large_image": "art123", "small_image": "mp:external/xyz/cover.png" }
            }]
        }));

        let snapshot = normalizer.normalize(event).unwrap();
        let assets = &snapshot.activities[0].assets;
        assert_eq!(
            assets.enriched_media_art_url.as_deref(),
            Some("https://cdn.discordapp.com/app-assets/42/art123.png")
        );
        assert_eq!(assets.large_image_url, assets.enriched_media_art_url);
        assert_eq!(
            assets.small_image_url.as_deref(),
            Some("https://media.discordapp.net/external/xyz/cover.png")
        );
        assert_eq!(snapshot.activities[0].kind, Some(ActivityType::Listening));
    }

    #[test]
    fn test_enrichment_only_on_matching_activity() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1" },
            "activities": [
                { "name": "Minecraft", "type": 0, "application_id": "7", "assets": { "large_image": "logo" } },
                { "name": "Spotify", "type": 2, "details": "Song A" }
            ]
        }));

        let snapshot = normalizer.normalize(event).unwrap();
        assert_eq!(snapshot.activities.len(), 2);
        assert!(snapshot.activities[0].media.is_none());
        assert!(snapshot.activities[0].assets.enriched_media_art_url.is_none());
        assert!(snapshot.activities[1].media.is_some());
        assert_eq!(
            snapshot.media().and_then(|m| m.song.as_deref()),
            Some("Song A")
        );
    }

    #[test]
    fn test_no_enrichment_without_integration() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1" },
            "activities": [{ "name": "spotify", "details": "lowercase is not a match" }]
        }));

        let snapshot = normalizer.normalize(event).unwrap();
        assert!(snapshot.media().is_none());
        assert!(snapshot.activities.iter().all(|a| a.media.is_none()));
    }

    #[test]
    fn test_started_at_and_unknown_status() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1" },
            "status": "something-new",
            "activities": [{ "name": "Game", "type": 9, "timestamps": { "start": 1700000000000i64 } }]
        }));

        let snapshot = normalizer.normalize(event).unwrap();
        assert_eq!(snapshot.status, PresenceStatus::Offline);
        let activity = &snapshot.activities[0];
        assert_eq!(activity.kind, None);
        assert_eq!(
            activity.started_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn test_activity_order_is_preserved() {
        let normalizer = Normalizer::default();
        let event = raw(json!({
            "user": { "id": "u1" },
            "activities": [{ "name": "B" }, { "name": "A" }, { "name": "C" }]
        }));

        let names: Vec<_> = normalizer
            .normalize(event)
            .unwrap()
            .activities
            .into_iter()
            .filter_map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }
}
