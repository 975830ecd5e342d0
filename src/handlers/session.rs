//! Session history lookup.

use crate::error::{AppError, Result};
use crate::state::{AppState, SessionState};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// GET /session/:id - Session history keyed by opaque id.
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionState>> {
    let sessions = state.sessions.lock().await;
    sessions
        .get(&session_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("session '{}'", session_id)))
}
