//! HTTP error mapping

use asset_library::BackendError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use preview_pipeline::TransformError;
use serde_json::json;

use crate::session::SessionError;

/// Errors returned by API handlers as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Message already formatted for the panel that triggered it
    #[error("{0}")]
    Upstream(String),

    #[error("Failed to open in new tab: {0}")]
    Export(TransformError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::CONFLICT,
            ApiError::Transform(TransformError::CompilerUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Transform(_) | ApiError::Export(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Backend(BackendError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Backend(BackendError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Backend(_) | ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Request failed ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
