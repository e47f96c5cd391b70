//! Rendering of the typed pipeline into aggregation documents.
//!
//! The rendered form is what a document store driver receives and what
//! diagnostics print:
//!
//! ```text
//! [
//!   { "$search": { "text": { "query": "iPhone", "path": { "wildcard": "*" } } } },
//!   { "$match": { "$and": [ { "Price": { "$gt": 30 } } ] } },
//!   { "$sort": { "Price": 1 } },
//!   { "$facet": { "data": [ { "$skip": 0 }, { "$limit": 10 } ],
//!                 "count": [ { "$count": "total" } ] } }
//! ]
//! ```

use serde_json::{json, Map, Value};

use super::stage::{FieldPredicate, Pipeline, Predicate, PredicateValue, Stage};

/// Name of the fan-out branch holding the page of documents
pub const DATA_BRANCH: &str = "data";

/// Name of the fan-out branch holding the count record
pub const COUNT_BRANCH: &str = "count";

/// Field of the count record carrying the total
pub const TOTAL_FIELD: &str = "total";

impl Pipeline {
    /// Render every stage, in order
    pub fn to_documents(&self) -> Vec<Value> {
        self.stages().iter().map(Stage::to_document).collect()
    }

    /// Render as one JSON array
    pub fn to_json(&self) -> Value {
        Value::Array(self.to_documents())
    }
}

impl Stage {
    /// Render this stage as an aggregation document
    pub fn to_document(&self) -> Value {
        match self {
            Stage::Search { query } => json!({
                "$search": {
                    "text": {
                        "query": query,
                        "path": { "wildcard": "*" }
                    }
                }
            }),
            Stage::Match(predicates) => {
                let clauses: Vec<Value> = predicates.iter().map(FieldPredicate::to_document).collect();
                json!({ "$match": { "$and": clauses } })
            }
            Stage::Sort(spec) => {
                let mut sort = Map::new();
                sort.insert(spec.field.clone(), json!(spec.direction.as_i32()));
                json!({ "$sort": sort })
            }
            Stage::PageAndCount(window) => json!({
                "$facet": {
                    "data": [
                        { "$skip": window.skip },
                        { "$limit": window.limit }
                    ],
                    "count": [
                        { "$count": TOTAL_FIELD }
                    ]
                }
            }),
        }
    }
}

impl FieldPredicate {
    /// Render as `{ <field>: <condition> }`
    pub fn to_document(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(self.field.clone(), self.predicate.to_condition());
        Value::Object(clause)
    }
}

impl Predicate {
    /// Render the operator part of a predicate
    pub fn to_condition(&self) -> Value {
        match self {
            Predicate::Eq(v) => json!({ "$eq": v.to_json() }),
            Predicate::Ne(v) => json!({ "$ne": v.to_json() }),
            Predicate::Gt(n) => json!({ "$gt": number(*n) }),
            Predicate::Gte(n) => json!({ "$gte": number(*n) }),
            Predicate::Lt(n) => json!({ "$lt": number(*n) }),
            Predicate::Lte(n) => json!({ "$lte": number(*n) }),
            Predicate::Regex(p) => json!({ "$regex": p }),
            Predicate::NotRegex(p) => json!({ "$not": { "$regex": p } }),
        }
    }
}

impl PredicateValue {
    pub fn to_json(&self) -> Value {
        match self {
            PredicateValue::Number(n) => number(*n),
            PredicateValue::String(s) => Value::String(s.clone()),
            PredicateValue::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Integral values render as integers, everything else as doubles
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
