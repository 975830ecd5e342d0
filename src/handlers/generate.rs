//! Direct code synthesis handler for a known action name.

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Name of the action to invoke; must exist in the merged catalog.
    pub action: String,
    /// Parameter overrides for the synthesized call.
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub action_name: String,
    pub code: String,
}

/// POST /generate - Synthesize code for a named action.
///
/// 404 when the action is unknown; 400 when an override value has no
/// renderable literal form. Synthesis is pure string assembly, so it runs
/// inline on the read guard.
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    if request.action.is_empty() {
        return Err(AppError::Validation(
            "Action name cannot be empty".to_string(),
        ));
    }

    let overrides = request.parameters.unwrap_or_default();
    let service = state.service.read().await;
    let code = service.generate(&request.action, &overrides)?;

    metrics::counter!("generate_requests_total").increment(1);

    Ok(Json(GenerateResponse {
        action_name: request.action,
        code,
    }))
}
