//! Semantic retrieval handler: rank catalog actions against a query.

use crate::error::{AppError, Result};
use crate::retriever::RetrievalResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default number of results to return
fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    /// The natural language query to match against actions
    pub query: String,
    /// Number of top results to return (default: 3)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub results: Vec<RetrievalResult>,
}

/// POST /retrieve - Rank catalog actions by relevance to a query.
///
/// Embeds the query, runs exact nearest-neighbor search over the indexed
/// catalog, and returns up to `top_k` candidates ascending by distance. An
/// empty result list means "no match", not an error.
pub async fn retrieve_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>> {
    let start = std::time::Instant::now();

    if request.query.is_empty() {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }
    if request.top_k == 0 {
        return Err(AppError::Validation(
            "top_k must be at least 1".to_string(),
        ));
    }

    let _permit = tokio::time::timeout(Duration::from_secs(10), state.semaphore.acquire())
        .await
        .map_err(|_| {
            AppError::Resource("Service temporarily overloaded, please retry".to_string())
        })?
        .map_err(|_| AppError::Resource("Semaphore closed".to_string()))?;

    let service = Arc::clone(&state.service).read_owned().await;
    let query = request.query.clone();
    let top_k = request.top_k;

    let results = tokio::task::spawn_blocking(move || service.retrieve(&query, top_k))
        .await
        .map_err(|e| AppError::Model(format!("Task join error: {}", e)))??;

    let total_time = start.elapsed();
    tracing::info!(
        query = %request.query,
        top_k,
        results = results.len(),
        total_ms = total_time.as_millis() as u64,
        "Retrieve completed"
    );

    metrics::counter!("retrieve_requests_total").increment(1);
    metrics::histogram!("retrieve_latency_ms").record(total_time.as_millis() as f64);

    Ok(Json(RetrieveResponse { results }))
}
