//! # Filter Descriptor
//!
//! Untyped `(field, operator, value)` triple as received from callers.

use serde::{Deserialize, Serialize};

use super::errors::{CompileError, CompileResult};
use super::operator::FilterOperator;
use crate::pipeline::FieldPredicate;

/// A single filter as sent in the request body.
///
/// The operator is kept as raw text so that an unknown token surfaces as
/// `InvalidOperator` naming the field, not as a body parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Field to filter on
    pub field: String,

    /// Operator token
    pub operator: String,

    /// Value to compare against, always text
    #[serde(default, deserialize_with = "value_as_text")]
    pub value: String,
}

impl FilterDescriptor {
    /// Create a new filter descriptor
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Resolve the operator token against the operator table
    pub fn operator(&self) -> CompileResult<FilterOperator> {
        FilterOperator::from_token(&self.operator)
            .ok_or_else(|| CompileError::invalid_operator(&self.operator, &self.field))
    }

    /// Compile this descriptor into one predicate
    pub fn compile(&self) -> CompileResult<FieldPredicate> {
        if self.field.trim().is_empty() {
            return Err(CompileError::invalid_parameter(
                "field",
                &self.field,
                "field name must not be empty",
            ));
        }

        let operator = self.operator()?;
        operator.apply(&self.field, &self.value)
    }
}

/// Accept scalar JSON values for `value` and keep their textual form.
///
/// Callers frequently send `"value": 30` or `"value": true`; these are
/// treated exactly like `"30"` and `"true"`. `null` becomes the empty string.
fn value_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "filter value must be a scalar, got {}",
            other
        ))),
    }
}
