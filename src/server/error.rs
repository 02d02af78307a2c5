use crate::models::ErrorResponse;
use crate::Error;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error returned by every handler. Rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge,
    NotFound(String),
    AnalysisFailed,
    BadGateway,
    ServiceUnavailable,
    Internal,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUpload(msg) => ApiError::BadRequest(msg),
            Error::PayloadTooLarge { .. } => ApiError::PayloadTooLarge,
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Classification(_) => ApiError::AnalysisFailed,
            Error::GenerationUnavailable(_) => ApiError::BadGateway,
            Error::GenerationUnreachable(_) => ApiError::ServiceUnavailable,
            other => {
                tracing::error!("Unexpected error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large (max 10MB)".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::AnalysisFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Cloud analysis failed".to_string(),
            ),
            ApiError::BadGateway => (
                StatusCode::BAD_GATEWAY,
                "Image generation service unavailable".to_string(),
            ),
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
