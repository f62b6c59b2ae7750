//! Route definitions for the presence HTTP API.
//!
//! Every route is served both at the root and under `/api`.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Builds the router and threads `AppState` through every route.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(presence_routes())
        .nest("/api", presence_routes())
        .with_state(state)
}

/// Queries, the live stream, and health.
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(handlers::activities::list_activities))
        .route(
            "/activities/{user_id}",
            get(handlers::activities::get_activity),
        )
        .route("/stream", get(handlers::stream::stream))
        .route("/health", get(handlers::health::health))
}
