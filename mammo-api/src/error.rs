//! Error types for mammo-api
//!
//! Client errors (4xx) carry their message to the caller. Server errors
//! (5xx) are logged with full detail and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::{AnalysisError, UploadError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upload rejected by validation (400)
    #[error("Validation failed ({code}): {message}")]
    Validation { code: &'static str, message: String },

    /// Classifier failed (500)
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation { code, message } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::AnalysisFailed(detail) => {
                error!("Analysis failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_FAILED",
                    "AI analysis failed".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileType { .. } => ApiError::Validation {
                code: "INVALID_FILE_TYPE",
                message: err.to_string(),
            },
            UploadError::FileTooLarge { .. } => ApiError::Validation {
                code: "FILE_TOO_LARGE",
                message: err.to_string(),
            },
            UploadError::EmptyFile => ApiError::Validation {
                code: "EMPTY_FILE",
                message: err.to_string(),
            },
            UploadError::Io(_) | UploadError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NotFound(_) => ApiError::NotFound("Study not found".to_string()),
            AnalysisError::FileMissing { .. } => {
                ApiError::NotFound("Image file not found".to_string())
            }
            AnalysisError::AnalysisFailed { .. } => ApiError::AnalysisFailed(err.to_string()),
            AnalysisError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<mammo_common::Error> for ApiError {
    fn from(err: mammo_common::Error) -> Self {
        match err {
            mammo_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            mammo_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
