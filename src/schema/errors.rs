//! Schema error types
//!
//! Error codes:
//! - INVALID_DATE (write body carries a value that is not a date)
//! - VALIDATION_FAILED (document breaks the collection's `$jsonSchema`)

use std::fmt;

use serde_json::Value;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Declared date field holds an unparseable value
    InvalidDate,
    /// Document violates the collection validator
    ValidationFailed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::InvalidDate => "INVALID_DATE",
            SchemaErrorCode::ValidationFailed => "VALIDATION_FAILED",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Offending field, if the error concerns one
    field: Option<String>,
    /// Structured validation report
    details: Option<Value>,
}

impl SchemaError {
    /// Create an invalid date error
    pub fn invalid_date(field: impl Into<String>, value: &Value) -> Self {
        let field = field.into();
        let shown = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            code: SchemaErrorCode::InvalidDate,
            message: format!("Invalid value '{}' for date field '{}'", shown, field),
            field: Some(field),
            details: None,
        }
    }

    /// Create a validation failed error carrying the rule report
    pub fn validation_failed(details: Value) -> Self {
        Self {
            code: SchemaErrorCode::ValidationFailed,
            message: "Document failed validation".into(),
            field: None,
            details: Some(details),
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Consumes the error, returning its validation report
    pub fn into_details(self) -> Option<Value> {
        self.details
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::InvalidDate.code(), "INVALID_DATE");
        assert_eq!(SchemaErrorCode::ValidationFailed.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_invalid_date_message() {
        let err = SchemaError::invalid_date("createdAt", &json!("yesterday"));
        assert_eq!(err.code(), SchemaErrorCode::InvalidDate);
        assert_eq!(err.field(), Some("createdAt"));
        assert_eq!(
            err.to_string(),
            "Invalid value 'yesterday' for date field 'createdAt'"
        );

        let err = SchemaError::invalid_date("createdAt", &json!(true));
        assert!(err.to_string().contains("'true'"));
    }

    #[test]
    fn test_validation_failed_keeps_details() {
        let err = SchemaError::validation_failed(json!({"operatorName": "$jsonSchema"}));
        assert_eq!(err.message(), "Document failed validation");
        assert_eq!(
            err.into_details(),
            Some(json!({"operatorName": "$jsonSchema"}))
        );
    }
}
