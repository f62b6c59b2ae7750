//! Server-sent-events presence stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /stream
///
/// Sends `{"message":"connected"}` first, then one frame per published
/// snapshot. The subscription is released when the client goes away.
pub async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let subscription = state.engine.subscribe()?;
    info!(subscriber = %subscription.handle(), "Stream client connected");

    let events = subscription.filter_map(|message| async move {
        match message.to_json() {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(e) => {
                warn!(error = %e, "Skipping unserializable stream frame");
                None
            }
        }
    });

    let interval = Duration::from_secs(state.engine.config().keep_alive_seconds.max(1));
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(interval)))
}
