//! # Document Store
//!
//! The collaborator the query core runs against. One handle is created at
//! startup and shared by every request; implementations must be safe for
//! concurrent use.
//!
//! - `MemoryStore`: reference store that evaluates pipelines in process
//! - `MongoStore`: MongoDB driver adapter (cargo feature `mongodb`)

mod errors;
mod matcher;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo;
mod ordering;
mod outcome;

use async_trait::async_trait;
use serde_json::Value;

use crate::pipeline::Pipeline;

pub use errors::{
    StoreError, StoreResult, DUPLICATE_KEY_CODE, IMMUTABLE_FIELD_CODE, VALIDATION_ERROR_CODE,
};
pub use matcher::{Matcher, TextSearch};
pub use memory::{MemoryStore, Seed, SeedCollection};
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;
pub use ordering::compare_values;
pub use outcome::{
    CollectionRef, DatabaseInfo, DeleteOutcome, Document, DocumentId, InsertOutcome,
    UpdateOutcome,
};

/// Operations the service needs from a document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a pipeline as one request and return its output records
    async fn aggregate(&self, target: &CollectionRef, pipeline: &Pipeline)
        -> StoreResult<Vec<Document>>;

    /// Validator document declared on a collection, if any
    async fn validator(&self, target: &CollectionRef) -> StoreResult<Option<Value>>;

    /// Insert one document
    async fn insert_one(&self, target: &CollectionRef, document: Document)
        -> StoreResult<InsertOutcome>;

    /// Set the given fields on the document with this `_id`
    async fn update_one(
        &self,
        target: &CollectionRef,
        id: &DocumentId,
        changes: Document,
    ) -> StoreResult<UpdateOutcome>;

    /// Delete the document with this `_id`
    async fn delete_one(&self, target: &CollectionRef, id: &DocumentId)
        -> StoreResult<DeleteOutcome>;

    /// Every database with its collection names
    async fn list_databases(&self) -> StoreResult<Vec<DatabaseInfo>>;
}
