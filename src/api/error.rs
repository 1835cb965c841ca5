//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::credential::CredentialError;
use crate::pipeline::classifier::ClassifierError;
use crate::session::AnalyzeError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("An analysis is already running")]
    Busy,
    #[error("Not ready: {0}")]
    NotReady(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Busy => (
                StatusCode::CONFLICT,
                "ANALYSIS_IN_PROGRESS",
                "An analysis is already running".to_string(),
            ),
            ApiError::NotReady(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_READY",
                detail.clone(),
            ),
            ApiError::InferenceFailed(detail) => (
                StatusCode::BAD_GATEWAY,
                "INFERENCE_FAILED",
                detail.clone(),
            ),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Busy => ApiError::Busy,
            AnalyzeError::NotReady(_) => ApiError::NotReady(err.to_string()),
            AnalyzeError::Classifier(ClassifierError::ModelNotReady) => {
                ApiError::NotReady(ClassifierError::ModelNotReady.to_string())
            }
            AnalyzeError::Classifier(e) => ApiError::InferenceFailed(e.to_string()),
            AnalyzeError::Interrupted(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Empty => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
