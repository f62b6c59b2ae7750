//! Normalized activity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ActivityType;

/// One activity inside a [`PresenceSnapshot`](crate::PresenceSnapshot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Activity name (game title, integration name, ...).
    pub name: Option<String>,
    /// Activity kind.
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,
    /// First detail line.
    pub details: Option<String>,
    /// Second detail line.
    pub state: Option<String>,
    /// Platform the activity runs on.
    pub platform: Option<String>,
    /// When the activity started.
    pub started_at: Option<DateTime<Utc>>,
    /// Resolved image assets and captions.
    pub assets: ActivityAssets,
    /// Media-integration metadata; only set on the matching activity.
    pub media: Option<MediaEnrichment>,
}

/// Image assets of an activity. Every URL is absolute or `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAssets {
    pub large_image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_text: Option<String>,
    pub small_text: Option<String>,
    /// Album art when this activity is the recognized media integration.
    pub enriched_media_art_url: Option<String>,
}

/// Track metadata pulled from a media-sharing integration's activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEnrichment {
    pub song: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub art_url: Option<String>,
}
