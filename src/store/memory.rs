//! In-process document store.
//!
//! Holds databases, collections and ordered documents behind one
//! `RwLock`, and evaluates pipelines with the same semantics a document
//! database applies to the rendered aggregation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult, DUPLICATE_KEY_CODE, IMMUTABLE_FIELD_CODE};
use super::matcher::{lookup, Matcher, TextSearch};
use super::ordering::compare_values;
use super::outcome::{
    CollectionRef, DatabaseInfo, DeleteOutcome, Document, DocumentId, InsertOutcome,
    UpdateOutcome,
};
use super::DocumentStore;
use crate::pipeline::{
    PageWindow, Pipeline, SortDirection, SortSpec, Stage, COUNT_BRANCH, DATA_BRANCH, TOTAL_FIELD,
};
use crate::schema::{SchemaValidator, ValidatorSchema};

/// Error code for a search stage placed after another stage
const SEARCH_NOT_FIRST_CODE: i32 = 40602;

/// Error code for an update path that crosses a non-document value
const PATH_NOT_VIABLE_CODE: i32 = 28;

/// One collection: optional validator plus its documents in insertion order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedCollection {
    #[serde(default)]
    pub validator: Option<Value>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Seed file layout: database name -> collection name -> collection
pub type Seed = BTreeMap<String, BTreeMap<String, SeedCollection>>;

/// Reference store evaluating pipelines in process
#[derive(Debug, Default)]
pub struct MemoryStore {
    databases: RwLock<Seed>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self {
            databases: RwLock::new(seed),
        }
    }

    /// Load a seed file
    pub fn load_seed(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Unavailable(format!("Failed to read seed {}: {}", path.display(), e))
        })?;
        let seed: Seed = serde_json::from_str(&content).map_err(|e| {
            StoreError::Unavailable(format!("Invalid seed {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), databases = seed.len(), "loaded seed");
        Ok(Self::from_seed(seed))
    }

    /// Add or replace a collection
    pub fn with_collection(
        mut self,
        target: &CollectionRef,
        validator: Option<Value>,
        documents: Vec<Document>,
    ) -> Self {
        self.databases
            .get_mut()
            .entry(target.database.clone())
            .or_default()
            .insert(
                target.collection.clone(),
                SeedCollection {
                    validator,
                    documents,
                },
            );
        self
    }

    /// Add or replace a collection without a validator
    pub fn with_documents(self, target: &CollectionRef, documents: Vec<Value>) -> Self {
        let documents = documents
            .into_iter()
            .filter_map(|d| match d {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect();
        self.with_collection(target, None, documents)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn aggregate(
        &self,
        target: &CollectionRef,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Document>> {
        let mut working = {
            let databases = self.databases.read().await;
            databases
                .get(&target.database)
                .and_then(|collections| collections.get(&target.collection))
                .map(|collection| collection.documents.clone())
                .unwrap_or_default()
        };

        for (index, stage) in pipeline.stages().iter().enumerate() {
            working = match stage {
                Stage::Search { query } => {
                    if index != 0 {
                        return Err(StoreError::rejected(
                            SEARCH_NOT_FIRST_CODE,
                            "$search is only valid as the first stage in a pipeline",
                        ));
                    }
                    let search = TextSearch::new(query);
                    working.retain(|d| search.matches(d));
                    working
                }
                Stage::Match(predicates) => {
                    let matcher = Matcher::compile(predicates)?;
                    working.retain(|d| matcher.matches(d));
                    working
                }
                Stage::Sort(spec) => {
                    sort_documents(&mut working, spec);
                    working
                }
                Stage::PageAndCount(window) => vec![page_and_count(working, *window)],
            };
        }

        Ok(working)
    }

    async fn validator(&self, target: &CollectionRef) -> StoreResult<Option<Value>> {
        let databases = self.databases.read().await;
        Ok(databases
            .get(&target.database)
            .and_then(|collections| collections.get(&target.collection))
            .and_then(|collection| collection.validator.clone()))
    }

    async fn insert_one(
        &self,
        target: &CollectionRef,
        mut document: Document,
    ) -> StoreResult<InsertOutcome> {
        let mut databases = self.databases.write().await;
        let collection = databases
            .entry(target.database.clone())
            .or_default()
            .entry(target.collection.clone())
            .or_default();

        let id = document
            .entry("_id")
            .or_insert_with(|| Value::String(Uuid::new_v4().simple().to_string()))
            .clone();

        if collection.documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::rejected(
                DUPLICATE_KEY_CODE,
                format!(
                    "E11000 duplicate key error collection: {} index: _id_ dup key: {{ _id: {} }}",
                    target, id
                ),
            ));
        }

        validate(collection.validator.as_ref(), &document)?;
        collection.documents.push(document);

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        target: &CollectionRef,
        id: &DocumentId,
        changes: Document,
    ) -> StoreResult<UpdateOutcome> {
        let mut databases = self.databases.write().await;
        let Some(collection) = databases
            .get_mut(&target.database)
            .and_then(|collections| collections.get_mut(&target.collection))
        else {
            return Ok(update_outcome(0, 0));
        };

        let Some(existing) = collection.documents.iter_mut().find(|d| id.matches(d)) else {
            return Ok(update_outcome(0, 0));
        };

        if let Some(new_id) = changes.get("_id") {
            if existing.get("_id") != Some(new_id) {
                return Err(StoreError::rejected(
                    IMMUTABLE_FIELD_CODE,
                    "Performing an update on the path '_id' would modify the immutable field '_id'",
                ));
            }
        }

        let mut updated = existing.clone();
        for (path, value) in changes {
            set_path(&mut updated, &path, value)?;
        }

        if updated == *existing {
            return Ok(update_outcome(1, 0));
        }

        validate(collection.validator.as_ref(), &updated)?;
        *existing = updated;

        Ok(update_outcome(1, 1))
    }

    async fn delete_one(
        &self,
        target: &CollectionRef,
        id: &DocumentId,
    ) -> StoreResult<DeleteOutcome> {
        let mut databases = self.databases.write().await;
        let deleted = databases
            .get_mut(&target.database)
            .and_then(|collections| collections.get_mut(&target.collection))
            .and_then(|collection| {
                let position = collection.documents.iter().position(|d| id.matches(d))?;
                collection.documents.remove(position);
                Some(1)
            })
            .unwrap_or(0);

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: deleted,
        })
    }

    async fn list_databases(&self) -> StoreResult<Vec<DatabaseInfo>> {
        let databases = self.databases.read().await;
        Ok(databases
            .iter()
            .map(|(name, collections)| DatabaseInfo {
                database_name: name.clone(),
                collections: collections.keys().cloned().collect(),
            })
            .collect())
    }
}

/// Stable sort on one field
fn sort_documents(documents: &mut [Document], spec: &SortSpec) {
    documents.sort_by(|a, b| {
        let ordering = compare_values(lookup(a, &spec.field), lookup(b, &spec.field));
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Fan-out record: the windowed data branch and the count branch
fn page_and_count(documents: Vec<Document>, window: PageWindow) -> Document {
    let total = documents.len();
    let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);

    let data: Vec<Value> = documents
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(Value::Object)
        .collect();

    // An empty input produces no count record at all
    let count = if total == 0 {
        Vec::new()
    } else {
        let mut record = Document::new();
        record.insert(TOTAL_FIELD.to_string(), Value::from(total as u64));
        vec![Value::Object(record)]
    };

    let mut record = Document::new();
    record.insert(DATA_BRANCH.to_string(), Value::Array(data));
    record.insert(COUNT_BRANCH.to_string(), Value::Array(count));
    record
}

fn validate(validator: Option<&Value>, document: &Document) -> StoreResult<()> {
    let schema = ValidatorSchema::from_validator(validator);
    SchemaValidator::new(&schema)
        .validate_document(document)
        .map_err(|e| StoreError::validation(e.into_details().unwrap_or(Value::Null)))
}

/// `$set` one possibly dotted path
fn set_path(document: &mut Document, path: &str, value: Value) -> StoreResult<()> {
    let Some((head, rest)) = path.split_once('.') else {
        document.insert(path.to_string(), value);
        return Ok(());
    };

    let entry = document
        .entry(head)
        .or_insert_with(|| Value::Object(Document::new()));

    if let Value::Object(inner) = entry {
        return set_path(inner, rest, value);
    }

    Err(StoreError::rejected(
        PATH_NOT_VIABLE_CODE,
        format!("Cannot create field '{}' in element {{{}: {}}}", rest, head, entry),
    ))
}

fn update_outcome(matched: u64, modified: u64) -> UpdateOutcome {
    UpdateOutcome {
        acknowledged: true,
        matched_count: matched,
        modified_count: modified,
        upserted_count: 0,
        upserted_id: None,
    }
}
