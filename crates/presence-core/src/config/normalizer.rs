//! Presence normalization settings: asset hosts and the recognized media integration.

use serde::{Deserialize, Serialize};

/// Normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// CDN host for application assets and avatars.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
    /// Public host that serves externally proxied media.
    #[serde(default = "default_media_host")]
    pub media_host: String,
    /// Activity name of the first-party media-sharing integration.
    #[serde(default = "default_media_integration")]
    pub media_integration: String,
    /// Requested avatar size in pixels.
    #[serde(default = "default_avatar_size")]
    pub avatar_size: u32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
            media_host: default_media_host(),
            media_integration: default_media_integration(),
            avatar_size: default_avatar_size(),
        }
    }
}

fn default_cdn_host() -> String {
    "https://cdn.discordapp.com".to_string()
}

fn default_media_host() -> String {
    "https://media.discordapp.net".to_string()
}

fn default_media_integration() -> String {
    "Spotify".to_string()
}

fn default_avatar_size() -> u32 {
    256
}
