//! Cross-origin handling: the allow-list guard and the CORS header layer.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use presence_core::AppError;
use presence_core::config::CorsConfig;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects requests whose `Origin` is not on the allow-list.
///
/// Requests without an `Origin` header (same-origin, curl, server-to-server)
/// pass through untouched.
pub async fn origin_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let cors = &state.config.server.cors;
        let allowed = origin.to_str().is_ok_and(|o| cors.is_allowed(o));
        if !allowed {
            warn!(origin = ?origin, path = %request.uri().path(), "Rejected cross-origin request");
            return ApiError::from(AppError::forbidden("Not allowed by CORS")).into_response();
        }
    }

    next.run(request).await
}

/// Builds the CORS header layer from configuration. Only `GET` is exposed.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .max_age(Duration::from_secs(config.max_age_seconds));

    if config.allows_any() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
