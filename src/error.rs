use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Failed to load tool catalog: {0}")]
    DataLoadError(String),

    #[error("Failed to initialize embedding index: {0}")]
    EmbeddingInitError(String),

    #[error("Recommendation failed: {0}")]
    RecommendationError(String),

    #[error("Analysis failed: {0}")]
    AnalysisError(String),

    #[error("Tool not found: {0}")]
    ToolNotFoundError(String),

    #[error("Invalid tool selection: {0}")]
    InvalidSelectionError(String),

    #[error("Model inference failed: {0}")]
    ModelError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Service temporarily unavailable: {0}")]
    ResourceError(String),

    #[error("Embeddings cache error: {0}")]
    CacheError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ToolNotFoundError(name) => {
                tracing::info!(tool = %name, "Tool lookup miss");
                StatusCode::NOT_FOUND
            }
            AppError::InvalidSelectionError(msg) | AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                StatusCode::BAD_REQUEST
            }
            AppError::ResourceError(msg) => {
                tracing::warn!(error = %msg, "Resource error");
                StatusCode::SERVICE_UNAVAILABLE
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<ort::Error> for AppError {
    fn from(err: ort::Error) -> Self {
        AppError::ModelError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::ToolNotFoundError("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidSelectionError("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ResourceError("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::RecommendationError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::AnalysisError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
