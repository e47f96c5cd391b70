//! MongoDB adapter.
//!
//! Pipelines and write bodies are rendered to extended JSON and converted
//! to BSON; results come back as relaxed extended JSON, so dates keep the
//! `{"$date": ..}` form used everywhere else in the service.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document as BsonDocument};
use futures_util::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::info;

use super::errors::{StoreError, StoreResult, VALIDATION_ERROR_CODE};
use super::outcome::{
    CollectionRef, DatabaseInfo, DeleteOutcome, Document, DocumentId, InsertOutcome,
    UpdateOutcome,
};
use super::DocumentStore;
use crate::pipeline::Pipeline;

/// Document store backed by a MongoDB deployment
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect and verify the deployment answers a ping
    pub async fn connect(uri: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(map_error)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(map_error)?;

        info!("connected to MongoDB");
        Ok(Self { client })
    }

    fn collection(&self, target: &CollectionRef) -> Collection<BsonDocument> {
        self.client
            .database(&target.database)
            .collection::<BsonDocument>(&target.collection)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn aggregate(
        &self,
        target: &CollectionRef,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Document>> {
        let stages = pipeline
            .to_documents()
            .into_iter()
            .map(to_bson_document)
            .collect::<StoreResult<Vec<_>>>()?;

        let cursor = self
            .collection(target)
            .aggregate(stages, None)
            .await
            .map_err(map_error)?;
        let records: Vec<BsonDocument> = cursor.try_collect().await.map_err(map_error)?;

        records.into_iter().map(from_bson_document).collect()
    }

    async fn validator(&self, target: &CollectionRef) -> StoreResult<Option<Value>> {
        let mut specs = self
            .client
            .database(&target.database)
            .list_collections(doc! { "name": target.collection.as_str() }, None)
            .await
            .map_err(map_error)?;

        let spec = specs.try_next().await.map_err(map_error)?;
        Ok(spec
            .and_then(|s| s.options.validator)
            .map(|v| Bson::Document(v).into_relaxed_extjson()))
    }

    async fn insert_one(
        &self,
        target: &CollectionRef,
        document: Document,
    ) -> StoreResult<InsertOutcome> {
        let document = to_bson_document(Value::Object(document))?;
        let result = self
            .collection(target)
            .insert_one(document, None)
            .await
            .map_err(map_error)?;

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: result.inserted_id.into_relaxed_extjson(),
        })
    }

    async fn update_one(
        &self,
        target: &CollectionRef,
        id: &DocumentId,
        changes: Document,
    ) -> StoreResult<UpdateOutcome> {
        let changes = to_bson_document(Value::Object(changes))?;
        let result = self
            .collection(target)
            .update_one(id_filter(id), doc! { "$set": changes }, None)
            .await
            .map_err(map_error)?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(Bson::into_relaxed_extjson),
        })
    }

    async fn delete_one(
        &self,
        target: &CollectionRef,
        id: &DocumentId,
    ) -> StoreResult<DeleteOutcome> {
        let result = self
            .collection(target)
            .delete_one(id_filter(id), None)
            .await
            .map_err(map_error)?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn list_databases(&self) -> StoreResult<Vec<DatabaseInfo>> {
        let names = self
            .client
            .list_database_names(None, None)
            .await
            .map_err(map_error)?;

        let mut databases = Vec::with_capacity(names.len());
        for name in names {
            let mut collections = self
                .client
                .database(&name)
                .list_collection_names(None)
                .await
                .map_err(map_error)?;
            collections.sort();

            databases.push(DatabaseInfo {
                database_name: name,
                collections,
            });
        }

        Ok(databases)
    }
}

/// `_id` filter; hex strings also match the equivalent ObjectId
fn id_filter(id: &DocumentId) -> BsonDocument {
    match id {
        DocumentId::Int(n) => doc! { "_id": *n },
        DocumentId::String(s) => match ObjectId::parse_str(s) {
            Ok(oid) => doc! { "_id": { "$in": [oid, s.as_str()] } },
            Err(_) => doc! { "_id": s.as_str() },
        },
    }
}

fn to_bson_document(value: Value) -> StoreResult<BsonDocument> {
    match Bson::try_from(value) {
        Ok(Bson::Document(document)) => Ok(document),
        Ok(other) => Err(StoreError::Internal(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
        Err(e) => Err(StoreError::Internal(format!("invalid extended JSON: {}", e))),
    }
}

fn from_bson_document(document: BsonDocument) -> StoreResult<Document> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Internal(format!(
            "expected a document, got {}",
            other
        ))),
    }
}

fn map_error(err: MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == VALIDATION_ERROR_CODE => {
            // errInfo carries the rule report under "details"
            let details = write
                .details
                .as_ref()
                .map(|info| match info.get("details") {
                    Some(inner) => inner.clone().into_relaxed_extjson(),
                    None => Bson::Document(info.clone()).into_relaxed_extjson(),
                })
                .unwrap_or(Value::Null);
            StoreError::Validation {
                message: write.message.clone(),
                details,
            }
        }
        ErrorKind::Write(WriteFailure::WriteError(write)) => {
            StoreError::rejected(write.code, write.message.clone())
        }
        ErrorKind::Command(command) => StoreError::rejected(command.code, command.message.clone()),
        ErrorKind::ServerSelection { message, .. } => StoreError::Unavailable(message.clone()),
        ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extended_json_round_trip_keeps_dates() {
        let value = json!({"at": {"$date": "2024-01-01T00:00:00Z"}, "n": 3});
        let document = to_bson_document(value).unwrap();
        assert!(matches!(document.get("at"), Some(Bson::DateTime(_))));

        let back = from_bson_document(document).unwrap();
        assert_eq!(back["n"], 3);
        assert!(back["at"].get("$date").is_some());
    }

    #[test]
    fn test_non_document_is_rejected() {
        assert!(to_bson_document(json!([1, 2])).is_err());
    }

    #[test]
    fn test_id_filter() {
        assert_eq!(id_filter(&DocumentId::Int(4)), doc! { "_id": 4_i64 });
        assert_eq!(
            id_filter(&DocumentId::String("abc".into())),
            doc! { "_id": "abc" }
        );

        let hex = "65a1f0c2e4b0a1b2c3d4e5f6";
        let filter = id_filter(&DocumentId::String(hex.into()));
        assert!(filter.get_document("_id").unwrap().contains_key("$in"));
    }
}
