//! Prompt-to-code handler: retrieve the best-matching action for a free-text
//! prompt and synthesize code invoking it.

use crate::error::{AppError, Result};
use crate::retriever::RetrievalResult;
use crate::state::{AppState, HistoryEntry};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// Natural language instruction to match against the action catalog.
    pub prompt: String,
    /// Opaque session id; a fresh one is minted when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Parameter overrides forwarded to code synthesis.
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub session_id: String,
    pub action_name: String,
    /// Synthesized source text, ready for the external runner.
    pub code: String,
    pub metadata: ActionMetadata,
    pub distance: f32,
}

#[derive(Debug, Serialize)]
pub struct ActionMetadata {
    pub name: String,
    pub description: String,
    pub parameters: crate::registry::ParameterSchema,
}

/// POST /execute - Match a prompt to an action and synthesize invoking code.
///
/// # Flow
/// 1. Validate the prompt
/// 2. Acquire a semaphore permit (503 if the encoder pool is saturated)
/// 3. Retrieve ranked candidates, take the top match
/// 4. Synthesize code for it with the caller's parameter overrides
/// 5. Append to session history and respond
pub async fn execute_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>> {
    let start = std::time::Instant::now();

    if request.prompt.is_empty() {
        return Err(AppError::Validation("Prompt cannot be empty".to_string()));
    }

    let _permit = tokio::time::timeout(Duration::from_secs(10), state.semaphore.acquire())
        .await
        .map_err(|_| {
            AppError::Resource("Service temporarily overloaded, please retry".to_string())
        })?
        .map_err(|_| AppError::Resource("Semaphore closed".to_string()))?;

    // Owned read guard so retrieval and generation observe one consistent
    // catalog snapshot inside the blocking task.
    let service = Arc::clone(&state.service).read_owned().await;
    let prompt = request.prompt.clone();
    let overrides = request.parameters.clone().unwrap_or_default();
    let top_k = state.config.default_top_k;

    let (top, code) = tokio::task::spawn_blocking(move || {
        let mut results = service.retrieve(&prompt, top_k)?;
        if results.is_empty() {
            return Err(AppError::NotFound(
                "no action matched the prompt".to_string(),
            ));
        }
        let top = results.remove(0);
        let code = service.generate(&top.name, &overrides)?;
        Ok::<(RetrievalResult, String), AppError>((top, code))
    })
    .await
    .map_err(|e| AppError::Model(format!("Task join error: {}", e)))??;

    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    {
        let mut sessions = state.sessions.lock().await;
        let session = sessions.entry(session_id.clone()).or_default();
        session.history.push(HistoryEntry::new(
            request.prompt.clone(),
            top.name.clone(),
            request.parameters.unwrap_or_default(),
        ));
    }

    let total_time = start.elapsed();
    tracing::info!(
        prompt = %request.prompt,
        action = %top.name,
        distance = top.distance,
        total_ms = total_time.as_millis() as u64,
        "Execute completed"
    );

    metrics::counter!("execute_requests_total").increment(1);
    metrics::histogram!("execute_latency_ms").record(total_time.as_millis() as f64);

    Ok(Json(ExecuteResponse {
        session_id,
        action_name: top.name.clone(),
        code,
        metadata: ActionMetadata {
            name: top.name,
            description: top.description,
            parameters: top.parameters,
        },
        distance: top.distance,
    }))
}
