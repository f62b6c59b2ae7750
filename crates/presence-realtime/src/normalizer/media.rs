//! Enrichment for the recognized media-sharing integration.

use presence_entity::{MediaEnrichment, RawActivity};

/// Recognizes the media integration's activity by exact name.
#[derive(Debug, Clone)]
pub struct MediaMatcher {
    integration: String,
}

impl MediaMatcher {
    /// Creates a matcher for activities named exactly `integration`.
    pub fn new(integration: impl Into<String>) -> Self {
        Self {
            integration: integration.into(),
        }
    }

    /// Whether `activity` belongs to the integration.
    pub fn matches(&self, activity: &RawActivity) -> bool {
        activity.name.as_deref() == Some(self.integration.as_str())
    }

    /// Extracts track metadata from a matching activity.
    ///
    /// `art_url` is the activity's large image, already resolved.
    pub fn extract(&self, activity: &RawActivity, art_url: Option<String>) -> Option<MediaEnrichment> {
        if !self.matches(activity) {
            return None;
        }

        Some(MediaEnrichment {
            song: activity.details.clone(),
            artist: activity.state.clone(),
            album: activity.assets.as_ref().and_then(|a| a.large_text.clone()),
            art_url,
        })
    }
}
