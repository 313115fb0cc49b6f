//! Semantic recommendation handler.

use crate::error::{AppError, Result};
use crate::intelligence::Recommendation;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    /// Free-text description of the need
    pub query: String,
    /// Number of results (default: `DEFAULT_TOP_K`)
    pub top_k: Option<usize>,
}

/// GET /recommend - Rank catalog tools against a free-text need.
///
/// # Flow
/// 1. Validate top_k
/// 2. Acquire semaphore permit (bounds concurrent query embeddings)
/// 3. Embed query and rank on the blocking pool
pub async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<Vec<Recommendation>>> {
    let start_time = std::time::Instant::now();
    let top_k = params.top_k.unwrap_or(state.config.default_top_k);

    if top_k == 0 {
        return Err(AppError::ValidationError(
            "top_k must be at least 1".to_string(),
        ));
    }

    // Acquire semaphore with timeout (503 if service overloaded)
    let _permit = tokio::time::timeout(Duration::from_secs(10), state.semaphore.acquire())
        .await
        .map_err(|_| {
            AppError::ResourceError("Service temporarily overloaded, please retry".to_string())
        })?
        .map_err(|_| AppError::ResourceError("Semaphore closed".to_string()))?;

    let intelligence = Arc::clone(&state.intelligence);
    let query = params.query.clone();

    let results = tokio::task::spawn_blocking(move || intelligence.recommend(&query, top_k))
        .await
        .map_err(|e| {
            tracing::error!(query = %params.query, stage = "join", error = %e, "Recommendation task failed");
            AppError::RecommendationError(format!("Task join error: {}", e))
        })??;

    let total_time = start_time.elapsed();
    tracing::info!(
        query = %params.query,
        top_k,
        returned = results.len(),
        total_ms = total_time.as_millis() as u64,
        "Recommendation completed"
    );

    metrics::counter!("recommend_requests_total").increment(1);
    metrics::histogram!("recommend_latency_ms").record(total_time.as_millis() as f64);

    Ok(Json(results))
}
