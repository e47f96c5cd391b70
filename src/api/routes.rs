//! Collection HTTP Routes
//!
//! Query, schema, single-document writes and database listing.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use super::state::AppState;
use crate::executor::PageResult;
use crate::filter::FilterDescriptor;
use crate::pipeline::RawQueryParams;
use crate::schema::{DateCoercer, ValidatorSchema};
use crate::store::{
    CollectionRef, DatabaseInfo, DeleteOutcome, Document, DocumentId, InsertOutcome,
    UpdateOutcome,
};

/// Databases never listed by `GET /`
const SYSTEM_DATABASES: [&str; 2] = ["admin", "local"];

// ==================
// Routers
// ==================

/// Create collection routes
pub fn collection_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_databases))
        .route("/:database/:collection", post(query_collection))
        .route(
            "/:database/:collection/schema",
            with_id_writes(get(collection_schema), "schema"),
        )
        .route(
            "/:database/:collection/insert",
            with_id_writes(post(insert_document), "insert"),
        )
        .route(
            "/:database/:collection/:id",
            put(update_document).delete(delete_document),
        )
        .with_state(state)
}

/// Static segments shadow `/:id`, so documents whose `_id` is the segment
/// name are updated and deleted through these routes.
fn with_id_writes(
    route: MethodRouter<Arc<AppState>>,
    id: &'static str,
) -> MethodRouter<Arc<AppState>> {
    route
        .put(
            move |State(state): State<Arc<AppState>>,
                  Path((database, collection)): Path<(String, String)>,
                  body: Bytes| async move {
                update_by_id(&state, CollectionRef::new(database, collection), id, &body).await
            },
        )
        .delete(
            move |State(state): State<Arc<AppState>>,
                  Path((database, collection)): Path<(String, String)>| async move {
                delete_by_id(&state, CollectionRef::new(database, collection), id).await
            },
        )
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

// ==================
// Handlers
// ==================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// POST /:database/:collection
async fn query_collection(
    State(state): State<Arc<AppState>>,
    Path((database, collection)): Path<(String, String)>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<PageResult>> {
    let Query(pairs) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let filters = parse_filters(&body)?;
    let request = RawQueryParams::from_pairs(pairs).into_request(filters);
    let target = CollectionRef::new(database, collection);

    let page = state.executor.run(&target, &request).await?;
    Ok(Json(page))
}

/// GET /:database/:collection/schema
async fn collection_schema(
    State(state): State<Arc<AppState>>,
    Path((database, collection)): Path<(String, String)>,
) -> ApiResult<Json<Option<Value>>> {
    let target = CollectionRef::new(database, collection);
    let validator = state.store().validator(&target).await?;
    Ok(Json(validator))
}

/// POST /:database/:collection/insert
async fn insert_document(
    State(state): State<Arc<AppState>>,
    Path((database, collection)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<InsertOutcome>> {
    let target = CollectionRef::new(database, collection);
    let document = coerced_document(&state, &target, &body).await?;

    let outcome = state.store().insert_one(&target, document).await?;
    Ok(Json(outcome))
}

/// PUT /:database/:collection/:id
async fn update_document(
    State(state): State<Arc<AppState>>,
    Path((database, collection, id)): Path<(String, String, String)>,
    body: Bytes,
) -> ApiResult<Json<UpdateOutcome>> {
    update_by_id(&state, CollectionRef::new(database, collection), &id, &body).await
}

/// DELETE /:database/:collection/:id
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path((database, collection, id)): Path<(String, String, String)>,
) -> ApiResult<Json<DeleteOutcome>> {
    delete_by_id(&state, CollectionRef::new(database, collection), &id).await
}

async fn update_by_id(
    state: &AppState,
    target: CollectionRef,
    id: &str,
    body: &[u8],
) -> ApiResult<Json<UpdateOutcome>> {
    let changes = coerced_document(state, &target, body).await?;

    let outcome = state
        .store()
        .update_one(&target, &DocumentId::parse(id), changes)
        .await?;
    Ok(Json(outcome))
}

async fn delete_by_id(
    state: &AppState,
    target: CollectionRef,
    id: &str,
) -> ApiResult<Json<DeleteOutcome>> {
    let outcome = state
        .store()
        .delete_one(&target, &DocumentId::parse(id))
        .await?;
    Ok(Json(outcome))
}

/// GET /
async fn list_databases(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DatabaseInfo>>> {
    let databases = state
        .store()
        .list_databases()
        .await?
        .into_iter()
        .filter(|db| !SYSTEM_DATABASES.contains(&db.database_name.as_str()))
        .collect();
    Ok(Json(databases))
}

// ==================
// Body parsing
// ==================

/// Filter descriptors from a query body. An empty body or `null` means no filters.
pub fn parse_filters(body: &[u8]) -> ApiResult<Vec<FilterDescriptor>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match parse_json(body)? {
        Value::Null => Ok(Vec::new()),
        value @ Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidBody(format!("invalid filter descriptor: {}", e))),
        _ => Err(ApiError::InvalidBody(
            "expected an array of filter descriptors".to_string(),
        )),
    }
}

/// A write body, which must be a JSON object
pub fn parse_document(body: &[u8]) -> ApiResult<Document> {
    match parse_json(body)? {
        Value::Object(document) => Ok(document),
        _ => Err(ApiError::InvalidBody("expected a JSON object".to_string())),
    }
}

fn parse_json(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Parse a write body and coerce the collection's declared date fields
async fn coerced_document(
    state: &AppState,
    target: &CollectionRef,
    body: &[u8],
) -> ApiResult<Document> {
    let mut document = parse_document(body)?;
    let validator = state.store().validator(target).await?;
    let schema = ValidatorSchema::from_validator(validator.as_ref());

    DateCoercer::coerce(&mut document, &schema)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_empty_body() {
        assert!(parse_filters(b"").unwrap().is_empty());
        assert!(parse_filters(b"  \n").unwrap().is_empty());
        assert!(parse_filters(b"null").unwrap().is_empty());
        assert!(parse_filters(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_filters_keeps_order() {
        let filters = parse_filters(
            br#"[{"field": "Price", "operator": ">", "value": "30"},
                 {"field": "Name", "operator": "contains", "value": "Pro"}]"#,
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].field, "Price");
        assert_eq!(filters[1].operator, "contains");
    }

    #[test]
    fn test_parse_filters_rejects_non_arrays() {
        assert!(matches!(
            parse_filters(br#"{"field": "a"}"#),
            Err(ApiError::InvalidBody(_))
        ));
        assert!(matches!(parse_filters(b"[1"), Err(ApiError::InvalidBody(_))));
        assert!(matches!(parse_filters(b"[1]"), Err(ApiError::InvalidBody(_))));
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document(br#"{"Name": "x"}"#).unwrap();
        assert_eq!(doc["Name"], "x");
        assert!(parse_document(b"[]").is_err());
        assert!(parse_document(b"").is_err());
    }
}
