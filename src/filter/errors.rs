//! # Filter Compilation Errors
//!
//! Raised before any store interaction; a single bad descriptor aborts
//! the whole request.

use thiserror::Error;

use super::operator::FilterOperator;

/// Result type for filter compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Filter compilation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Operator token is not in the operator table
    #[error("Invalid operator '{token}' for field '{field}'")]
    InvalidOperator { token: String, field: String },

    /// Value failed the coercion its operator requires
    #[error("Invalid value '{value}' for field '{field}' with operator '{operator}': {reason}")]
    InvalidValue {
        field: String,
        operator: String,
        value: String,
        reason: String,
    },
}

impl CompileError {
    /// Create an invalid operator error
    pub fn invalid_operator(token: impl Into<String>, field: impl Into<String>) -> Self {
        CompileError::InvalidOperator {
            token: token.into(),
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::InvalidValue {
            field: field.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid value error that is not tied to a filter operator
    pub fn invalid_parameter(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::InvalidValue {
            field: field.into(),
            operator: String::new(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operator_names_token_and_field() {
        let err = CompileError::invalid_operator("like", "Name");
        let msg = err.to_string();
        assert!(msg.contains("'like'"));
        assert!(msg.contains("'Name'"));
    }

    #[test]
    fn test_invalid_value_message() {
        let err = CompileError::invalid_value("Price", FilterOperator::Gt, "abc", "expected a number");
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for field 'Price' with operator '>': expected a number"
        );
    }
}
