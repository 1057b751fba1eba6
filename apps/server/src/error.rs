//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Conflict(serde_json::Value),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Conflict(body) => (StatusCode::CONFLICT, body),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<adboard_core::Error> for ApiError {
    fn from(err: adboard_core::Error) -> Self {
        match err {
            adboard_core::Error::Unauthorized => ApiError::Unauthorized,
            adboard_core::Error::Validation(message) => ApiError::BadRequest(message),
            adboard_core::Error::SyncInProgress => ApiError::Conflict(json!({
                "error": err.to_string(),
                "errorKind": "already_in_progress",
            })),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
