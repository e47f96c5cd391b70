//! Result types for query execution

use serde::Serialize;
use serde_json::Value;

use super::errors::{ExecutorError, ExecutorResult};
use crate::pipeline::{COUNT_BRANCH, DATA_BRANCH, TOTAL_FIELD};
use crate::store::Document;

/// One page of matching documents plus the total across all pages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageResult {
    /// Documents on this page, in pipeline order
    pub data: Vec<Document>,
    /// Count of documents matching search and filters, ignoring pagination
    pub total: u64,
}

impl PageResult {
    /// Creates an empty page
    pub fn empty() -> Self {
        Self::default()
    }

    /// Unwrap the single fan-out record a pipeline produces.
    ///
    /// A missing record or an empty count branch means nothing matched.
    pub fn from_fan_out(record: Option<Document>) -> ExecutorResult<Self> {
        let Some(mut record) = record else {
            return Ok(Self::empty());
        };

        let data = match record.remove(DATA_BRANCH) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(document) => Ok(document),
                    other => Err(ExecutorError::MalformedOutput(format!(
                        "data entry is not a document: {}",
                        other
                    ))),
                })
                .collect::<ExecutorResult<Vec<_>>>()?,
            _ => {
                return Err(ExecutorError::MalformedOutput(format!(
                    "missing '{}' branch",
                    DATA_BRANCH
                )))
            }
        };

        let total = match record.remove(COUNT_BRANCH) {
            Some(Value::Array(counts)) => match counts.first() {
                None => 0,
                Some(entry) => entry.get(TOTAL_FIELD).and_then(Value::as_u64).ok_or_else(|| {
                    ExecutorError::MalformedOutput(format!("count entry has no '{}'", TOTAL_FIELD))
                })?,
            },
            _ => {
                return Err(ExecutorError::MalformedOutput(format!(
                    "missing '{}' branch",
                    COUNT_BRANCH
                )))
            }
        };

        Ok(Self { data, total })
    }

    /// Returns true if the page holds no documents
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of documents on the page
    pub fn len(&self) -> usize {
        self.data.len()
    }
}
