//! # API Errors
//!
//! Every failure reaching a handler becomes exactly one JSON error body
//! `{status, message, validationErrorDetails?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::executor::ExecutorError;
use crate::filter::CompileError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Unknown operator or uncoercible filter value
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Body is not the expected JSON shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// Declared date field holds an unparseable value
    #[error(transparent)]
    Schema(#[from] SchemaError),

    // ==================
    // Store Errors (400 for validation, else 5xx)
    // ==================
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Pipeline output could not be interpreted
    #[error("{0}")]
    Internal(String),
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Compile(e) => ApiError::Compile(e),
            ExecutorError::Store(e) => ApiError::Store(e),
            ExecutorError::MalformedOutput(reason) => {
                ApiError::Internal(format!("Malformed pipeline output: {}", reason))
            }
        }
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::Compile(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Schema(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) if e.is_validation() => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured report of a store validation rejection
    pub fn validation_details(&self) -> Option<&Value> {
        match self {
            ApiError::Store(StoreError::Validation { details, .. }) => Some(details),
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error_details: Option<Value>,
}

impl From<ApiError> for ErrorBody {
    fn from(err: ApiError) -> Self {
        Self {
            status: err.status_code().as_u16(),
            validation_error_details: err.validation_details().cloned(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(ErrorBody::from(self))).into_response()
    }
}
