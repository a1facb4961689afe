//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fswap_akool::AkoolError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Swap failed: {0}")]
    Swap(#[from] AkoolError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Swap(e) => match e {
                // Caller gave us something unusable.
                AkoolError::MissingInput(_) | AkoolError::MissingLandmarks => {
                    StatusCode::BAD_REQUEST
                }
                // Valid request, but the media content cannot be processed.
                AkoolError::NoFaceDetected | AkoolError::LandmarksMissing => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                // Server-side misconfiguration.
                AkoolError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
                AkoolError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                // Everything else is the upstream provider or hosting failing.
                AkoolError::Rejected { .. }
                | AkoolError::HttpStatus { .. }
                | AkoolError::JobFailed { .. }
                | AkoolError::MissingJobId
                | AkoolError::Transport(_)
                | AkoolError::MalformedResponse(_)
                | AkoolError::Hosting(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Io(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { detail };

        (status, Json(body)).into_response()
    }
}
