use crate::error::{AppError, Result};
use crate::intelligence::ComparisonResult;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    /// Comma-separated tool names, 2 to 4 of them
    pub tools: String,
}

/// Split the `tools` parameter on commas, trimming and dropping blanks.
pub fn parse_tool_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /compare - Feature comparison of 2-4 tools.
pub async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareParams>,
) -> Result<Json<ComparisonResult>> {
    let names = parse_tool_list(&params.tools);
    metrics::counter!("compare_requests_total").increment(1);

    let result = state.intelligence.compare_many(names.as_slice()).map_err(|e| {
        if matches!(e, AppError::ToolNotFoundError(_)) {
            metrics::counter!("compare_not_found_total").increment(1);
        }
        e
    })?;

    tracing::info!(tools = ?names, resolved = result.len(), "Comparison completed");

    Ok(Json(result))
}
