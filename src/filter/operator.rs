//! # Operator Table
//!
//! Closed set of filter operator tokens and the mapping from
//! `(operator, raw value, field)` to a typed predicate.

use std::fmt;

use super::errors::{CompileError, CompileResult};
use crate::pipeline::{FieldPredicate, Predicate, PredicateValue};

/// Filter operators accepted in a filter descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// `=`: numeric equality
    NumEq,
    /// `!=`: numeric inequality
    NumNe,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `contains`: unanchored substring
    Contains,
    /// `not contains`
    NotContains,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
    /// `equals`: string equality
    Equals,
    /// `not equals`: string inequality
    NotEquals,
    /// `is empty`: equal to the empty string
    IsEmpty,
    /// `is not empty`: not equal to the empty string
    IsNotEmpty,
    /// `is`: boolean equality
    Is,
}

impl FilterOperator {
    /// Every recognized operator, in table order
    pub const ALL: [FilterOperator; 15] = [
        FilterOperator::NumEq,
        FilterOperator::NumNe,
        FilterOperator::Gt,
        FilterOperator::Lt,
        FilterOperator::Gte,
        FilterOperator::Lte,
        FilterOperator::Contains,
        FilterOperator::NotContains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Is,
    ];

    /// Look up an operator by its wire token
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "=" => FilterOperator::NumEq,
            "!=" => FilterOperator::NumNe,
            ">" => FilterOperator::Gt,
            "<" => FilterOperator::Lt,
            ">=" => FilterOperator::Gte,
            "<=" => FilterOperator::Lte,
            "contains" => FilterOperator::Contains,
            "not contains" => FilterOperator::NotContains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "equals" => FilterOperator::Equals,
            "not equals" => FilterOperator::NotEquals,
            "is empty" => FilterOperator::IsEmpty,
            "is not empty" => FilterOperator::IsNotEmpty,
            "is" => FilterOperator::Is,
            _ => return None,
        };
        Some(op)
    }

    /// Get the wire token for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::NumEq => "=",
            FilterOperator::NumNe => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Gte => ">=",
            FilterOperator::Lte => "<=",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not contains",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not equals",
            FilterOperator::IsEmpty => "is empty",
            FilterOperator::IsNotEmpty => "is not empty",
            FilterOperator::Is => "is",
        }
    }

    /// Whether the raw value must parse as a number
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FilterOperator::NumEq
                | FilterOperator::NumNe
                | FilterOperator::Gt
                | FilterOperator::Lt
                | FilterOperator::Gte
                | FilterOperator::Lte
        )
    }

    /// Apply this operator to a field and raw value, producing one predicate.
    ///
    /// Numeric operators fail with `InvalidValue` when the value is not a
    /// finite number. `is empty`/`is not empty` ignore the supplied value.
    pub fn apply(&self, field: &str, raw: &str) -> CompileResult<FieldPredicate> {
        let predicate = match self {
            FilterOperator::NumEq => Predicate::Eq(PredicateValue::Number(self.number(field, raw)?)),
            FilterOperator::NumNe => Predicate::Ne(PredicateValue::Number(self.number(field, raw)?)),
            FilterOperator::Gt => Predicate::Gt(self.number(field, raw)?),
            FilterOperator::Lt => Predicate::Lt(self.number(field, raw)?),
            FilterOperator::Gte => Predicate::Gte(self.number(field, raw)?),
            FilterOperator::Lte => Predicate::Lte(self.number(field, raw)?),
            FilterOperator::Contains => Predicate::Regex(format!(".*{}.*", regex::escape(raw))),
            FilterOperator::NotContains => {
                Predicate::NotRegex(format!(".*{}.*", regex::escape(raw)))
            }
            FilterOperator::StartsWith => Predicate::Regex(format!("^{}.*", regex::escape(raw))),
            FilterOperator::EndsWith => Predicate::Regex(format!(".*{}$", regex::escape(raw))),
            FilterOperator::Equals => Predicate::Eq(PredicateValue::String(raw.to_string())),
            FilterOperator::NotEquals => Predicate::Ne(PredicateValue::String(raw.to_string())),
            FilterOperator::IsEmpty => Predicate::Eq(PredicateValue::String(String::new())),
            FilterOperator::IsNotEmpty => Predicate::Ne(PredicateValue::String(String::new())),
            FilterOperator::Is => Predicate::Eq(PredicateValue::Bool(raw == "true")),
        };

        Ok(FieldPredicate::new(field, predicate))
    }

    fn number(&self, field: &str, raw: &str) -> CompileResult<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CompileError::invalid_value(field, *self, raw, "expected a number"));
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            Ok(_) => Err(CompileError::invalid_value(field, *self, raw, "number must be finite")),
            Err(_) => Err(CompileError::invalid_value(field, *self, raw, "expected a number")),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
