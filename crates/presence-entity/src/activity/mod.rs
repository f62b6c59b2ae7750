//! Activity entities.

pub mod model;

pub use model::{ActivityAssets, ActivityRecord, MediaEnrichment};

use serde::{Deserialize, Serialize};

/// Canonical activity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// "Playing {name}"
    Playing,
    /// "Streaming {details}"
    Streaming,
    /// "Listening to {name}"
    Listening,
    /// "Watching {name}"
    Watching,
    /// Custom status line.
    Custom,
    /// "Competing in {name}"
    Competing,
}

impl ActivityType {
    /// Maps the platform's numeric activity code. Unknown codes yield `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Playing),
            1 => Some(Self::Streaming),
            2 => Some(Self::Listening),
            3 => Some(Self::Watching),
            4 => Some(Self::Custom),
            5 => Some(Self::Competing),
            _ => None,
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Streaming => "streaming",
            Self::Listening => "listening",
            Self::Watching => "watching",
            Self::Custom => "custom",
            Self::Competing => "competing",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
