//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use presence_core::AppError;
use presence_core::config::AppConfig;
use presence_realtime::PresenceEngine;

use crate::middleware::cors::{build_cors_layer, origin_guard};
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// The origin guard sits outside the CORS layer so disallowed preflights
/// are rejected too.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state.clone())
        .layer(cors)
        .layer(axum_middleware::from_fn_with_state(state, origin_guard))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until `shutdown` fires.
///
/// Open streams are closed on shutdown so graceful shutdown can complete.
pub async fn run_server(
    config: Arc<AppConfig>,
    engine: PresenceEngine,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let addr = config.server.bind_addr();
    let app = build_app(AppState::new(Arc::clone(&config), engine.clone()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "Presence relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            engine.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
