//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`cs_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on domain calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message. Unexpected failures read "Internal Server Error".
    pub error: String,
    /// Stable snake_case error code.
    pub code: String,
    pub request_id: Option<String>,
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: cs_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: cs_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<cs_core::Error> for AppError {
    fn from(e: cs_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
            "Internal Server Error".to_string()
        } else {
            self.inner.to_string()
        };

        let body = ErrorResponse {
            error: message,
            code: self.inner.code().to_string(),
            request_id: self.request_id,
        };

        (status, axum::Json(body)).into_response()
    }
}
