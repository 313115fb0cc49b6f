//! Toolsight - tool-intelligence service
//!
//! Turns a catalog of software-tool descriptions into semantic
//! recommendations, SWOT-style insight and feature comparisons. The library
//! exposes the core components so they can be tested with injected fixtures
//! or embedded in other applications.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod intelligence;
pub mod persistence;
pub mod state;

// Re-export key types for convenience
pub use catalog::{Catalog, ToolRecord};
pub use config::{Config, EmbeddingBackend};
pub use error::{AppError, Result};
pub use handlers::{
    analyze_handler, compare_handler, health_handler, ready_handler, recommend_handler,
};
pub use inference::{HashingEmbedder, OnnxEmbedder, TextEmbedder};
pub use intelligence::{ComparisonResult, Recommendation, SwotResult, ToolIntelligence};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;

/// Query routes for the three operations plus health probes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recommend", get(recommend_handler))
        .route("/analyze", get(analyze_handler))
        .route("/compare", get(compare_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}
