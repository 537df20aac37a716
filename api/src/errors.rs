use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::airports::AirportError;
use crate::services::pipeline::PipelineError;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Prediction error: {0}")]
    PredictionError(#[from] PipelineError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PredictionError(err) => {
                tracing::error!("Prediction error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction error".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AirportError> for AppError {
    fn from(err: AirportError) -> Self {
        match err {
            AirportError::NotFound(_) => AppError::NotFound(err.to_string()),
            AirportError::Duplicate(_) | AirportError::Invalid(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
