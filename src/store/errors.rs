//! # Store Errors
//!
//! Failures reported by a document store collaborator.

use serde_json::Value;
use thiserror::Error;

/// Error code a store uses for schema-validation rejections on writes
pub const VALIDATION_ERROR_CODE: i32 = 121;

/// Error code for writes that collide on `_id`
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Error code for updates touching an immutable field
pub const IMMUTABLE_FIELD_CODE: i32 = 66;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the request (malformed stage, bad update, ...)
    #[error("{message}")]
    Rejected { code: Option<i32>, message: String },

    /// Store-enforced schema rejected a write
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Anything else the store reported
    #[error("Store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a rejection with a store error code
    pub fn rejected(code: i32, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Create a validation rejection with structured details
    pub fn validation(details: Value) -> Self {
        StoreError::Validation {
            message: "Document failed validation".to_string(),
            details,
        }
    }

    /// Store error code, if the store supplied one
    pub fn code(&self) -> Option<i32> {
        match self {
            StoreError::Rejected { code, .. } => *code,
            StoreError::Validation { .. } => Some(VALIDATION_ERROR_CODE),
            _ => None,
        }
    }

    /// Whether this is a schema-validation rejection
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }
}
