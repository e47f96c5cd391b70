//! Predicate and text-search evaluation for in-process pipelines.
//!
//! Semantics follow the document-store conventions the compiler targets:
//! - All predicates must match (AND semantics)
//! - Ordering comparisons only hold between numbers
//! - `Ne` and `NotRegex` also hold when the field is missing
//! - An array field matches when any element matches
//! - Dotted paths descend into sub-documents

use regex::Regex;
use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::outcome::Document;
use crate::pipeline::{FieldPredicate, Predicate, PredicateValue};

/// Error code for a stage the store cannot parse
const BAD_STAGE_CODE: i32 = 2;

/// Resolve a possibly dotted field path
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;

    for part in parts {
        current = current.as_object()?.get(part)?;
    }

    Some(current)
}

enum Test {
    Eq(PredicateValue),
    Ne(PredicateValue),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    Regex(Regex),
    NotRegex(Regex),
}

struct Clause {
    field: String,
    test: Test,
}

/// Compiled conjunction of field predicates
pub struct Matcher {
    clauses: Vec<Clause>,
}

impl Matcher {
    /// Compile predicates, rejecting patterns the regex engine refuses
    pub fn compile(predicates: &[FieldPredicate]) -> StoreResult<Self> {
        let clauses = predicates
            .iter()
            .map(|p| {
                let test = match &p.predicate {
                    Predicate::Eq(v) => Test::Eq(v.clone()),
                    Predicate::Ne(v) => Test::Ne(v.clone()),
                    Predicate::Gt(n) => Test::Gt(*n),
                    Predicate::Gte(n) => Test::Gte(*n),
                    Predicate::Lt(n) => Test::Lt(*n),
                    Predicate::Lte(n) => Test::Lte(*n),
                    Predicate::Regex(pattern) => Test::Regex(compile_regex(pattern)?),
                    Predicate::NotRegex(pattern) => Test::NotRegex(compile_regex(pattern)?),
                };
                Ok(Clause {
                    field: p.field.clone(),
                    test,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Self { clauses })
    }

    /// Checks if a document matches all predicates
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.matches(lookup(document, &clause.field)))
    }
}

impl Clause {
    fn matches(&self, value: Option<&Value>) -> bool {
        match &self.test {
            Test::Ne(expected) => !any_element(value, |v| eq_match(v, expected)),
            Test::NotRegex(re) => !any_element(value, |v| regex_match(v, re)),
            Test::Eq(expected) => any_element(value, |v| eq_match(v, expected)),
            Test::Gt(bound) => any_element(value, |v| num(v).is_some_and(|n| n > *bound)),
            Test::Gte(bound) => any_element(value, |v| num(v).is_some_and(|n| n >= *bound)),
            Test::Lt(bound) => any_element(value, |v| num(v).is_some_and(|n| n < *bound)),
            Test::Lte(bound) => any_element(value, |v| num(v).is_some_and(|n| n <= *bound)),
            Test::Regex(re) => any_element(value, |v| regex_match(v, re)),
        }
    }
}

/// Apply a test to a value, or to each element when the value is an array
fn any_element(value: Option<&Value>, test: impl Fn(&Value) -> bool) -> bool {
    match value {
        None => false,
        Some(Value::Array(items)) => items.iter().any(&test),
        Some(v) => test(v),
    }
}

fn num(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Exact equality; numbers compare by value
fn eq_match(actual: &Value, expected: &PredicateValue) -> bool {
    match (actual, expected) {
        (Value::Number(a), PredicateValue::Number(b)) => a.as_f64() == Some(*b),
        (Value::String(a), PredicateValue::String(b)) => a == b,
        (Value::Bool(a), PredicateValue::Bool(b)) => a == b,
        _ => false,
    }
}

fn regex_match(actual: &Value, re: &Regex) -> bool {
    actual.as_str().is_some_and(|s| re.is_match(s))
}

fn compile_regex(pattern: &str) -> StoreResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        StoreError::rejected(BAD_STAGE_CODE, format!("Regular expression is invalid: {}", e))
    })
}

/// Case-insensitive full-text search over every string value of a document.
///
/// The query is split into terms; a document matches when any of its
/// strings contains any term as a whole word.
pub struct TextSearch {
    terms: Vec<String>,
}

impl TextSearch {
    pub fn new(query: &str) -> Self {
        Self {
            terms: tokenize(query).collect(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        document.values().any(|v| self.matches_value(v))
    }

    fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => tokenize(s).any(|token| self.terms.contains(&token)),
            Value::Array(items) => items.iter().any(|v| self.matches_value(v)),
            Value::Object(obj) => obj.values().any(|v| self.matches_value(v)),
            _ => false,
        }
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCompiler, FilterDescriptor};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn matcher(descriptors: &[FilterDescriptor]) -> Matcher {
        Matcher::compile(&FilterCompiler::predicates(descriptors).unwrap()).unwrap()
    }

    #[test]
    fn test_numeric_comparisons_only_between_numbers() {
        let m = matcher(&[FilterDescriptor::new("Price", ">", "30")]);

        assert!(m.matches(&doc(json!({"Price": 31}))));
        assert!(m.matches(&doc(json!({"Price": 30.5}))));
        assert!(!m.matches(&doc(json!({"Price": 30}))));
        assert!(!m.matches(&doc(json!({"Price": "99"}))));
        assert!(!m.matches(&doc(json!({"Name": "x"}))));
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        let m = matcher(&[FilterDescriptor::new("Qty", "=", "3")]);
        assert!(m.matches(&doc(json!({"Qty": 3}))));
        assert!(m.matches(&doc(json!({"Qty": 3.0}))));
        assert!(!m.matches(&doc(json!({"Qty": "3"}))));
    }

    #[test]
    fn test_negations_match_missing_fields() {
        let m = matcher(&[FilterDescriptor::new("Notes", "is not empty", "")]);
        assert!(m.matches(&doc(json!({"Notes": "hi"}))));
        assert!(m.matches(&doc(json!({"Other": 1}))));
        assert!(!m.matches(&doc(json!({"Notes": ""}))));

        let m = matcher(&[FilterDescriptor::new("Name", "not contains", "Pro")]);
        assert!(m.matches(&doc(json!({"Name": "iPhone"}))));
        assert!(m.matches(&doc(json!({}))));
        assert!(!m.matches(&doc(json!({"Name": "iPhone Pro"}))));
    }

    #[test]
    fn test_is_empty_does_not_match_missing_field() {
        let m = matcher(&[FilterDescriptor::new("Notes", "is empty", "")]);
        assert!(m.matches(&doc(json!({"Notes": ""}))));
        assert!(!m.matches(&doc(json!({}))));
        assert!(!m.matches(&doc(json!({"Notes": null}))));
    }

    #[test]
    fn test_patterns() {
        let starts = matcher(&[FilterDescriptor::new("Name", "startswith", "iPh")]);
        let ends = matcher(&[FilterDescriptor::new("Name", "endswith", "Max")]);
        let contains = matcher(&[FilterDescriptor::new("Name", "contains", "15 P")]);

        let d = doc(json!({"Name": "iPhone 15 Pro Max"}));
        assert!(starts.matches(&d));
        assert!(ends.matches(&d));
        assert!(contains.matches(&d));

        let d = doc(json!({"Name": "Galaxy iPhone"}));
        assert!(!starts.matches(&d));
    }

    #[test]
    fn test_patterns_are_literal() {
        let m = matcher(&[FilterDescriptor::new("Sku", "contains", "A.1")]);
        assert!(m.matches(&doc(json!({"Sku": "XA.1Y"}))));
        assert!(!m.matches(&doc(json!({"Sku": "XAB1Y"}))));
    }

    #[test]
    fn test_array_fields_match_any_element() {
        let m = matcher(&[FilterDescriptor::new("tags", "equals", "sale")]);
        assert!(m.matches(&doc(json!({"tags": ["new", "sale"]}))));
        assert!(!m.matches(&doc(json!({"tags": ["new"]}))));

        let m = matcher(&[FilterDescriptor::new("tags", "not equals", "sale")]);
        assert!(!m.matches(&doc(json!({"tags": ["new", "sale"]}))));
    }

    #[test]
    fn test_dotted_paths() {
        let m = matcher(&[FilterDescriptor::new("specs.ram", ">=", "8")]);
        assert!(m.matches(&doc(json!({"specs": {"ram": 16}}))));
        assert!(!m.matches(&doc(json!({"specs": {"ram": 4}}))));
        assert!(!m.matches(&doc(json!({"specs": 8}))));
    }

    #[test]
    fn test_boolean() {
        let m = matcher(&[FilterDescriptor::new("inStock", "is", "true")]);
        assert!(m.matches(&doc(json!({"inStock": true}))));
        assert!(!m.matches(&doc(json!({"inStock": false}))));
        assert!(!m.matches(&doc(json!({"inStock": "true"}))));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let predicates = vec![FieldPredicate::new("a", Predicate::Regex("(".to_string()))];
        assert!(matches!(
            Matcher::compile(&predicates),
            Err(StoreError::Rejected { .. })
        ));
    }

    #[test]
    fn test_text_search() {
        let search = TextSearch::new("iPhone");
        assert!(search.matches(&doc(json!({"Name": "Apple iPhone 15"}))));
        assert!(search.matches(&doc(json!({"meta": {"title": "IPHONE case"}}))));
        assert!(search.matches(&doc(json!({"tags": ["phone", "iphone"]}))));
        assert!(!search.matches(&doc(json!({"Name": "iPhones"}))));
        assert!(!search.matches(&doc(json!({"Price": 10}))));
    }

    #[test]
    fn test_text_search_any_term() {
        let search = TextSearch::new("iPhone 15");
        assert!(search.matches(&doc(json!({"Name": "Pixel 15"}))));
        assert!(!search.matches(&doc(json!({"Name": "Pixel 8"}))));
        assert!(!TextSearch::new("  ").matches(&doc(json!({"Name": "x"}))));
    }
}
