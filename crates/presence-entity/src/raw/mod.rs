//! Raw presence payloads as delivered by the chat gateway.
//!
//! Field names follow the upstream JSON (snake_case). Nothing here is
//! validated; the normalizer decides what survives.

pub mod lenient;

use serde::{Deserialize, Serialize};

/// A single presence-change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPresenceEvent {
    #[serde(default, deserialize_with = "lenient::option")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub activities: Vec<RawActivity>,
}

/// A (possibly partial) user object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub discriminator: Option<String>,
    /// Avatar hash.
    #[serde(default, deserialize_with = "lenient::option")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub bot: Option<bool>,
}

impl RawUser {
    /// Whether the account is flagged as a bot.
    pub fn is_bot(&self) -> bool {
        self.bot.unwrap_or(false)
    }

    /// Fills fields missing on `self` from `known`. Fields present on `self` win.
    pub fn fill_from(&mut self, known: &RawUser) {
        fn fill(slot: &mut Option<String>, from: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }

        fill(&mut self.id, &known.id);
        fill(&mut self.username, &known.username);
        fill(&mut self.discriminator, &known.discriminator);
        fill(&mut self.avatar, &known.avatar);
        if self.bot.is_none() {
            self.bot = known.bot;
        }
    }
}

/// One activity entry of a presence event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default, deserialize_with = "lenient::option")]
    pub name: Option<String>,
    /// Numeric activity code.
    #[serde(rename = "type", default, deserialize_with = "lenient::option")]
    pub kind: Option<u8>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub application_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub timestamps: Option<RawTimestamps>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub assets: Option<RawAssets>,
}

/// Activity start in Unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimestamps {
    #[serde(default, deserialize_with = "lenient::option")]
    pub start: Option<i64>,
}

/// Unresolved image references and their captions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAssets {
    #[serde(default, deserialize_with = "lenient::option")]
    pub large_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub large_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub small_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub small_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_gateway_payload() {
        let event: RawPresenceEvent = serde_json::from_value(json!({
            "user": { "id": "80351110224678912", "username": "nelly", "avatar": "8342729096ea3675442027381ff50dfe" },
            "guild_id": "41771983423143937",
            "status": "online",
            "activities": [{
                "name": "Spotify",
                "type": 2,
                "details": "Song A",
                "state": "Artist A",
                "timestamps": { "start": 1700000000000i64 },
                "assets": { "large_image": "spotify:abc", "large_text": "Album A" }
            }],
            "client_status": { "desktop": "online" }
        }))
        .unwrap();

        let user = event.user.as_ref().unwrap();
        assert_eq!(user.id.as_deref(), Some("80351110224678912"));
        assert!(!user.is_bot());
        assert_eq!(event.activities.len(), 1);
        assert_eq!(event.activities[0].kind, Some(2));
        assert_eq!(
            event.activities[0].assets.as_ref().unwrap().large_image.as_deref(),
            Some("spotify:abc")
        );
    }

    #[test]
    fn test_malformed_fields_degrade_to_none() {
        let event: RawPresenceEvent = serde_json::from_value(json!({
            "user": { "id": "1", "bot": "yes" },
            "status": 7,
            "activities": [
                { "name": 42, "type": "playing", "timestamps": "soon", "assets": "oops" },
                "not-an-object"
            ]
        }))
        .unwrap();

        assert_eq!(event.user.as_ref().unwrap().bot, None);
        assert_eq!(event.status, None);
        assert_eq!(event.activities.len(), 1);
        let activity = &event.activities[0];
        assert_eq!(activity.name, None);
        assert_eq!(activity.kind, None);
        assert_eq!(activity.timestamps, None);
        assert_eq!(activity.assets, None);
    }

    #[test]
    fn test_non_array_activities_is_empty() {
        let event: RawPresenceEvent =
            serde_json::from_value(json!({ "user": { "id": "1" }, "activities": {} })).unwrap();
        assert!(event.activities.is_empty());
    }

    #[test]
    fn test_fill_from_keeps_present_fields() {
        let mut partial = RawUser {
            id: Some("1".to_string()),
            avatar: Some("new-hash".to_string()),
            ..RawUser::default()
        };
        let cached = RawUser {
            id: Some("1".to_string()),
            username: Some("nelly".to_string()),
            avatar: Some("old-hash".to_string()),
            bot: Some(false),
            ..RawUser::default()
        };

        partial.fill_from(&cached);

        assert_eq!(partial.username.as_deref(), Some("nelly"));
        assert_eq!(partial.avatar.as_deref(), Some("new-hash"));
        assert_eq!(partial.bot, Some(false));
    }
}
