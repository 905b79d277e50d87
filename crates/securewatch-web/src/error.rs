//! HTTP mapping for workspace errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use securewatch_common::SecureWatchError;
use serde_json::json;
use tracing::{error, warn};

/// Handler error: a `SecureWatchError` rendered as `{ "error": ... }`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SecureWatchError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SecureWatchError::InvalidFilter(_)   => StatusCode::BAD_REQUEST,
            SecureWatchError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            SecureWatchError::NotFound(_)        => StatusCode::NOT_FOUND,
            SecureWatchError::Conflict(_)        => StatusCode::CONFLICT,
            SecureWatchError::Config(_)          => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
