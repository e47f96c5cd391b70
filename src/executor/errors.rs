//! Executor error types

use thiserror::Error;

use crate::filter::CompileError;
use crate::store::StoreError;

/// Result type for pipeline execution
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Pipeline execution errors
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// Request could not be compiled; nothing was sent to the store
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Store failed or rejected the pipeline
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Fan-out record did not have the expected shape
    #[error("Malformed pipeline output: {0}")]
    MalformedOutput(String),
}

impl ExecutorError {
    /// Whether the failure was caused by the request rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExecutorError::Compile(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_errors_pass_through() {
        let err = ExecutorError::from(CompileError::invalid_operator("~", "Price"));
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid operator '~' for field 'Price'");
    }

    #[test]
    fn test_store_errors_are_not_client_errors() {
        let err = ExecutorError::from(StoreError::Unavailable("down".into()));
        assert!(!err.is_client_error());
        assert!(!ExecutorError::MalformedOutput("x".into()).is_client_error());
    }
}
