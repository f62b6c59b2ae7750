//! Point-in-time presence queries.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use presence_entity::PresenceSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /activities
///
/// Every stored snapshot, ordered by user id.
pub async fn list_activities(State(state): State<AppState>) -> Json<Vec<Arc<PresenceSnapshot>>> {
    Json(state.engine.query.list_all())
}

/// GET /activities/{user_id}
pub async fn get_activity(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Arc<PresenceSnapshot>>, ApiError> {
    let snapshot = state.engine.query.get_by_user(&user_id)?;
    Ok(Json(snapshot))
}
