//! API error types with JSON `{"detail": ...}` bodies.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Request failures: either the caller's fault (400) or ours (500).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("{operation} failed: {detail}")]
    Internal {
        operation: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(operation: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            operation,
            detail: err.to_string(),
        }
    }

    /// Bad input becomes a 400 carrying the library's message; anything else is internal.
    pub fn from_image(operation: &'static str, err: smartimg::Error) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::internal(operation, err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal { operation, detail } => {
                tracing::error!(operation, detail = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Image {operation} failed"),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}
