//! Gateway websocket client with heartbeat, resume and auto-reconnect.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use presence_core::config::GatewayConfig;
use presence_core::{AppError, AppResult};
use presence_entity::RawPresenceEvent;
use presence_realtime::PresenceSource;

use crate::cache::UserCache;
use crate::protocol::{self, GatewayPayload, GuildCreate, GuildMember, Hello, Ready, event, opcode};

type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A session that can be resumed after a dropped connection.
#[derive(Debug, Clone)]
struct ResumeState {
    session_id: String,
    resume_url: String,
}

/// How a single connection ended.
#[derive(Debug)]
enum SessionEnd {
    Shutdown,
    Reconnect { resume: bool, reason: String },
    Fatal(AppError),
}

/// Maintains a gateway connection and forwards presence changes.
#[derive(Debug)]
pub struct GatewayClient {
    config: GatewayConfig,
    users: UserCache,
    resume: Option<ResumeState>,
    sequence: Option<u64>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            users: UserCache::new(),
            resume: None,
            sequence: None,
        }
    }

    /// Users seen so far.
    pub fn users(&self) -> &UserCache {
        &self.users
    }

    fn connect_url(&self) -> String {
        match &self.resume {
            Some(state) => protocol::with_gateway_query(&state.resume_url),
            None => self.config.url.clone(),
        }
    }

    fn forget_session(&mut self) {
        self.resume = None;
        self.sequence = None;
    }

    /// Applies one dispatch and returns the presence events it produced.
    fn handle_dispatch(&mut self, name: &str, data: Value) -> Vec<RawPresenceEvent> {
        match name {
            event::READY => {
                match serde_json::from_value::<Ready>(data) {
                    Ok(ready) => {
                        info!(session = %ready.session_id, "Gateway session ready");
                        if let Some(user) = &ready.user {
                            self.users.remember(user);
                        }
                        self.resume = Some(ResumeState {
                            resume_url: ready
                                .resume_gateway_url
                                .unwrap_or_else(|| self.config.url.clone()),
                            session_id: ready.session_id,
                        });
                    }
                    Err(e) => warn!(error = %e, "Malformed READY payload"),
                }
                Vec::new()
            }
            event::RESUMED => {
                info!("Gateway session resumed");
                Vec::new()
            }
            event::GUILD_CREATE => {
                let guild: GuildCreate = serde_json::from_value(data).unwrap_or_default();
                for member in &guild.members {
                    if let Some(user) = &member.user {
                        self.users.remember(user);
                    }
                }
                debug!(
                    guild = guild.id.as_deref().unwrap_or("unknown"),
                    members = guild.members.len(),
                    presences = guild.presences.len(),
                    "Guild available"
                );
                guild
                    .presences
                    .into_iter()
                    .filter_map(|presence| self.complete(presence))
                    .collect()
            }
            event::GUILD_MEMBER_ADD | event::GUILD_MEMBER_UPDATE => {
                if let Ok(GuildMember { user: Some(user) }) = serde_json::from_value(data) {
                    self.users.remember(&user);
                }
                Vec::new()
            }
            event::PRESENCE_UPDATE => match serde_json::from_value::<RawPresenceEvent>(data) {
                Ok(presence) => self.complete(presence).into_iter().collect(),
                Err(e) => {
                    warn!(error = %e, "Malformed PRESENCE_UPDATE payload");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    /// Fills the presence's user from the cache.
    ///
    /// Returns `None` when the user is still unknown afterwards: with neither
    /// a username nor a bot flag there is no way to tell a bot account apart.
    fn complete(&self, mut presence: RawPresenceEvent) -> Option<RawPresenceEvent> {
        let user = presence.user.as_mut()?;
        self.users.complete(user);
        if user.bot.is_none() && user.username.is_none() {
            debug!(
                user_id = user.id.as_deref().unwrap_or("unknown"),
                "Dropping presence of uncached user"
            );
            return None;
        }
        Some(presence)
    }

    /// Runs one connection from hello to disconnect.
    async fn session(
        &mut self,
        ws: GatewaySocket,
        events: &mpsc::Sender<RawPresenceEvent>,
        shutdown: &CancellationToken,
    ) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        // 1. Hello
        let hello = match next_payload(&mut stream).await {
            Ok(Some(payload)) if payload.op == opcode::HELLO => {
                match serde_json::from_value::<Hello>(payload.d) {
                    Ok(hello) => hello,
                    Err(e) => return reconnect(true, format!("malformed hello: {e}")),
                }
            }
            Ok(Some(payload)) => {
                return reconnect(true, format!("expected hello, got op {}", payload.op));
            }
            Ok(None) => return reconnect(true, "closed before hello"),
            Err(end) => return end,
        };

        // 2. Identify or resume
        let opening = match &self.resume {
            Some(state) => {
                info!(session = %state.session_id, "Resuming gateway session");
                protocol::resume(&self.config.token, &state.session_id, self.sequence)
            }
            None => protocol::identify(&self.config.token, self.config.intents),
        };
        let opening = match opening {
            Ok(frame) => frame,
            Err(e) => return SessionEnd::Fatal(e),
        };
        if sink.send(Message::Text(opening.into())).await.is_err() {
            return reconnect(true, "failed to send identify");
        }

        // 3. Event loop
        let mut heartbeat =
            tokio::time::interval(Duration::from_millis(hello.heartbeat_interval.max(1)));
        heartbeat.tick().await;
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }

                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        return reconnect(true, "heartbeat not acknowledged");
                    }
                    let frame = match protocol::heartbeat(self.sequence) {
                        Ok(frame) => frame,
                        Err(e) => return SessionEnd::Fatal(e),
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        return reconnect(true, "heartbeat send failed");
                    }
                    awaiting_ack = true;
                }

                frame = stream.next() => {
                    let payload = match frame {
                        Some(Ok(Message::Text(text))) => match GatewayPayload::parse(text.as_str()) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!(error = %e, "Ignoring unparseable gateway frame");
                                continue;
                            }
                        },
                        Some(Ok(Message::Close(frame))) => return closed(frame),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return reconnect(true, format!("read error: {e}")),
                        None => return reconnect(true, "stream ended"),
                    };

                    if let Some(seq) = payload.s {
                        self.sequence = Some(seq);
                    }

                    match payload.op {
                        opcode::DISPATCH => {
                            let name = payload.t.unwrap_or_default();
                            for presence in self.handle_dispatch(&name, payload.d) {
                                match events.try_send(presence) {
                                    Ok(()) => {}
                                    Err(mpsc::error::TrySendError::Full(_)) => {
                                        warn!("Ingest queue full; dropping presence update");
                                    }
                                    Err(mpsc::error::TrySendError::Closed(_)) => {
                                        return SessionEnd::Shutdown;
                                    }
                                }
                            }
                        }
                        opcode::HEARTBEAT => {
                            let frame = match protocol::heartbeat(self.sequence) {
                                Ok(frame) => frame,
                                Err(e) => return SessionEnd::Fatal(e),
                            };
                            if sink.send(Message::Text(frame.into())).await.is_err() {
                                return reconnect(true, "heartbeat send failed");
                            }
                        }
                        opcode::HEARTBEAT_ACK => awaiting_ack = false,
                        opcode::RECONNECT => return reconnect(true, "gateway requested reconnect"),
                        opcode::INVALID_SESSION => {
                            let resumable = payload.d.as_bool().unwrap_or(false);
                            return reconnect(resumable, "invalid session");
                        }
                        other => debug!(op = other, "Unhandled gateway opcode"),
                    }
                }
            }
        }
    }
}

fn reconnect(resume: bool, reason: impl Into<String>) -> SessionEnd {
    SessionEnd::Reconnect {
        resume,
        reason: reason.into(),
    }
}

fn closed(frame: Option<CloseFrame>) -> SessionEnd {
    let Some(frame) = frame else {
        return reconnect(true, "closed by gateway");
    };
    let code = u16::from(frame.code);
    if protocol::is_fatal_close(code) {
        SessionEnd::Fatal(AppError::external_service(format!(
            "Gateway closed the connection with code {code}: {}",
            frame.reason.as_str()
        )))
    } else {
        reconnect(true, format!("closed with code {code}"))
    }
}

async fn next_payload(
    stream: &mut futures::stream::SplitStream<GatewaySocket>,
) -> Result<Option<GatewayPayload>, SessionEnd> {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                return GatewayPayload::parse(text.as_str())
                    .map(Some)
                    .map_err(|e| reconnect(true, format!("unparseable frame: {e}")));
            }
            Ok(Message::Close(frame)) => return Err(closed(frame)),
            Ok(_) => continue,
            Err(e) => return Err(reconnect(true, format!("read error: {e}"))),
        }
    }
    Ok(None)
}

#[async_trait]
impl PresenceSource for GatewayClient {
    async fn run(
        &mut self,
        events: mpsc::Sender<RawPresenceEvent>,
        shutdown: CancellationToken,
    ) -> AppResult<()> {
        let initial = Duration::from_millis(self.config.initial_backoff_ms.max(1));
        let max_backoff = Duration::from_millis(self.config.max_backoff_ms).max(initial);
        let mut backoff = initial;

        loop {
            let url = self.connect_url();
            info!(url = %url, resuming = self.resume.is_some(), "Connecting to gateway");

            let attempt = tokio::select! {
                result = connect_async(url.as_str()) => result,
                _ = shutdown.cancelled() => return Ok(()),
            };

            match attempt {
                Ok((ws, _)) => {
                    backoff = initial;
                    match self.session(ws, &events, &shutdown).await {
                        SessionEnd::Shutdown => {
                            info!("Gateway client shutting down");
                            return Ok(());
                        }
                        SessionEnd::Fatal(e) => {
                            error!(error = %e, "Gateway connection failed permanently");
                            return Err(e);
                        }
                        SessionEnd::Reconnect { resume, reason } => {
                            warn!(reason = %reason, resume, "Gateway connection lost");
                            if !resume {
                                self.forget_session();
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Failed to connect to gateway"),
            }

            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = shutdown.cancelled() => return Ok(()),
            }

            backoff = (backoff * 2).min(max_backoff);
        }
    }
}
