use crate::error::{AppError, Result};
use crate::intelligence::SwotResult;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub user_role: String,
}

/// GET /analyze - SWOT insight for a role or industry.
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<SwotResult>> {
    let intelligence = Arc::clone(&state.intelligence);
    let role = params.user_role.clone();

    let swot = tokio::task::spawn_blocking(move || intelligence.analyze(&role))
        .await
        .map_err(|e| {
            tracing::error!(user_role = %params.user_role, stage = "join", error = %e, "Analysis task failed");
            AppError::AnalysisError(format!("Task join error: {}", e))
        })?;

    tracing::info!(
        user_role = %params.user_role,
        strengths = swot.strengths.len(),
        weaknesses = swot.weaknesses.len(),
        "Analysis completed"
    );
    metrics::counter!("analyze_requests_total").increment(1);

    Ok(Json(swot))
}
