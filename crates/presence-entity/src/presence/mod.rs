//! Presence domain entities.

pub mod model;

pub use model::PresenceSnapshot;

use serde::{Deserialize, Serialize};

/// Online status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Connected and active.
    Online,
    /// Connected but idle.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Offline or invisible.
    Offline,
}

impl PresenceStatus {
    /// Parses a platform status, treating anything unrecognized as offline.
    pub fn from_str_or_offline(s: &str) -> Self {
        s.parse().unwrap_or(Self::Offline)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = presence_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "offline" | "invisible" => Ok(Self::Offline),
            _ => Err(presence_core::AppError::validation(format!(
                "Invalid presence status: '{s}'"
            ))),
        }
    }
}
