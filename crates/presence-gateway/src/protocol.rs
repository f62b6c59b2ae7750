//! Gateway wire format: opcodes, frames and the dispatch payloads we read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use presence_core::AppResult;
use presence_entity::raw::lenient;
use presence_entity::{RawPresenceEvent, RawUser};

/// Gateway opcodes.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RESUME: u8 = 6;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Dispatch event names the client acts on.
pub mod event {
    pub const READY: &str = "READY";
    pub const RESUMED: &str = "RESUMED";
    pub const GUILD_CREATE: &str = "GUILD_CREATE";
    pub const GUILD_MEMBER_ADD: &str = "GUILD_MEMBER_ADD";
    pub const GUILD_MEMBER_UPDATE: &str = "GUILD_MEMBER_UPDATE";
    pub const PRESENCE_UPDATE: &str = "PRESENCE_UPDATE";
}

/// Query string appended to URLs handed out by the gateway.
pub const GATEWAY_QUERY: &str = "v=10&encoding=json";

/// Close codes after which reconnecting cannot succeed.
///
/// 4004 authentication failed, 4010 invalid shard, 4011 sharding required,
/// 4012 invalid API version, 4013 invalid intents, 4014 disallowed intents.
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010..=4014)
}

/// Ensures a gateway URL carries the version and encoding query.
pub fn with_gateway_query(url: &str) -> String {
    if url.contains('?') {
        url.to_string()
    } else {
        format!("{}/?{GATEWAY_QUERY}", url.trim_end_matches('/'))
    }
}

/// Any frame received from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn parse(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A frame we send.
#[derive(Debug, Serialize)]
struct Outgoing<T: Serialize> {
    op: u8,
    d: T,
}

fn encode<T: Serialize>(op: u8, d: T) -> AppResult<String> {
    Ok(serde_json::to_string(&Outgoing { op, d })?)
}

/// `op 10` body.
#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

#[derive(Debug, Serialize)]
struct ConnectionProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

#[derive(Debug, Serialize)]
struct Identify<'a> {
    token: &'a str,
    intents: u64,
    properties: ConnectionProperties,
}

#[derive(Debug, Serialize)]
struct Resume<'a> {
    token: &'a str,
    session_id: &'a str,
    seq: Option<u64>,
}

/// `op 1` with the last sequence number seen.
pub fn heartbeat(sequence: Option<u64>) -> AppResult<String> {
    encode(opcode::HEARTBEAT, sequence)
}

/// `op 2` starting a new session.
pub fn identify(token: &str, intents: u64) -> AppResult<String> {
    encode(
        opcode::IDENTIFY,
        Identify {
            token,
            intents,
            properties: ConnectionProperties {
                os: std::env::consts::OS,
                browser: env!("CARGO_PKG_NAME"),
                device: env!("CARGO_PKG_NAME"),
            },
        },
    )
}

/// `op 6` continuing an existing session.
pub fn resume(token: &str, session_id: &str, sequence: Option<u64>) -> AppResult<String> {
    encode(
        opcode::RESUME,
        Resume {
            token,
            session_id,
            seq: sequence,
        },
    )
}

/// `READY` dispatch body.
#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub session_id: String,
    #[serde(default)]
    pub resume_gateway_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::option")]
    pub user: Option<RawUser>,
}

/// A guild member; only the user part matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildMember {
    #[serde(default, deserialize_with = "lenient::option")]
    pub user: Option<RawUser>,
}

/// `GUILD_CREATE` dispatch body: the initial member and presence lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildCreate {
    #[serde(default, deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub members: Vec<GuildMember>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub presences: Vec<RawPresenceEvent>,
}
