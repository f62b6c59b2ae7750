//! Chat gateway connection configuration.

use serde::{Deserialize, Serialize};

/// `GUILDS | GUILD_MEMBERS | GUILD_PRESENCES`
pub const DEFAULT_INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 8);

/// Gateway (upstream websocket) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bot token used to identify. Required.
    #[serde(default)]
    pub token: String,
    /// Gateway websocket URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Gateway intents bitfield.
    #[serde(default = "default_intents")]
    pub intents: u64,
    /// Initial reconnect delay in milliseconds.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Upper bound for the reconnect delay in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("url", &self.url)
            .field("intents", &self.intents)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            url: default_url(),
            intents: default_intents(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

fn default_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_intents() -> u64 {
    DEFAULT_INTENTS
}

fn default_initial_backoff() -> u64 {
    1_000
}

fn default_max_backoff() -> u64 {
    30_000
}
