//! Identifiers and write outcomes exchanged with a document store.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A document: field names mapped to values
pub type Document = serde_json::Map<String, Value>;

/// Database and collection a request targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Value of a document's `_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    Int(i64),
    String(String),
}

impl DocumentId {
    /// Integer ids when the text parses as one, string ids otherwise
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => DocumentId::Int(n),
            Err(_) => DocumentId::String(raw.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DocumentId::Int(n) => Value::from(*n),
            DocumentId::String(s) => Value::String(s.clone()),
        }
    }

    /// Whether a document's `_id` equals this id
    pub fn matches(&self, document: &Document) -> bool {
        match (self, document.get("_id")) {
            (DocumentId::Int(n), Some(Value::Number(id))) => {
                id.as_i64() == Some(*n) || id.as_f64() == Some(*n as f64)
            }
            (DocumentId::String(s), Some(Value::String(id))) => id == s,
            _ => false,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(n) => write!(f, "{}", n),
            DocumentId::String(s) => f.write_str(s),
        }
    }
}

/// Result of inserting one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

/// Result of updating one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Value>,
}

/// Result of deleting one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// A database and the names of its collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub database_name: String,
    pub collections: Vec<String>,
}
