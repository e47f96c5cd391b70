//! HTTP API tests
//!
//! Drive the full router (routes, CORS and tracing layers) with
//! `tower::ServiceExt::oneshot` over an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use docquery::api::{AppState, HttpServer, HttpServerConfig};
use docquery::store::{CollectionRef, MemoryStore};

fn products() -> CollectionRef {
    CollectionRef::new("shop", "products")
}

fn validator() -> Value {
    json!({
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["name"],
            "properties": {
                "name": {"bsonType": "string"},
                "ReleasedAt": {"bsonType": "date"}
            }
        }
    })
}

fn app() -> Router {
    let documents = [
        json!({"_id": 1, "name": "iPhone 15", "Price": 40, "inStock": true}),
        json!({"_id": 2, "name": "USB cable", "Price": 10, "inStock": true}),
        json!({"_id": 3, "name": "Charger", "Price": 25, "inStock": false}),
        json!({"_id": 4, "name": "Laptop stand", "Price": 50, "inStock": true}),
    ]
    .into_iter()
    .filter_map(|d| d.as_object().cloned())
    .collect();

    let store = MemoryStore::new()
        .with_collection(&products(), Some(validator()), documents)
        .with_documents(&CollectionRef::new("admin", "system.users"), vec![])
        .with_documents(&CollectionRef::new("local", "startup_log"), vec![]);

    router(store)
}

fn router(store: MemoryStore) -> Router {
    let state = Arc::new(AppState::new(Arc::new(store)));
    HttpServer::new(HttpServerConfig::default(), state).router()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

fn prices(page: &Value) -> Vec<i64> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["Price"].as_i64())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_query_with_filters_sort_and_paging() {
    let filters = json!([{"field": "inStock", "operator": "is", "value": "true"}]);
    let (status, body) = send(
        app(),
        Method::POST,
        "/shop/products?sort=Price%20asc&page=0&pageSize=2",
        Some(filters),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body), vec![10, 40]);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_repeated_parameters_keep_first_value() {
    let filters = json!([{"field": "inStock", "operator": "is", "value": "true"}]);
    let (status, body) = send(
        app(),
        Method::POST,
        "/shop/products?sort=Price%20asc&sort=Price%20desc&page=0&page=1&pageSize=2&pageSize=1",
        Some(filters),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body), vec![10, 40]);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_paging_values_parse_leniently() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/shop/products?sort=Price%20asc&page=zero&pageSize=2.9",
        Some(json!([])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body), vec![10, 25]);
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_query_with_empty_body() {
    let (status, body) = send(app(), Method::POST, "/shop/products?search=iPhone", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "iPhone 15");
}

#[tokio::test]
async fn test_invalid_operator_is_bad_request() {
    let filters = json!([{"field": "Price", "operator": "between", "value": "1"}]);
    let (status, body) = send(app(), Method::POST, "/shop/products", Some(filters)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("between"), "message: {message}");
    assert!(body.get("validationErrorDetails").is_none());
}

#[tokio::test]
async fn test_non_array_body_is_bad_request() {
    let (status, _) = send(
        app(),
        Method::POST,
        "/shop/products",
        Some(json!({"field": "Price"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schema_endpoint() {
    let (status, body) = send(app(), Method::GET, "/shop/products/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, validator());

    let (status, body) = send(app(), Method::GET, "/shop/unknown/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_insert_coerces_declared_dates() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/shop/products/insert",
        Some(json!({"_id": 10, "name": "Tablet", "ReleasedAt": "2024-03-01"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged"], true);
    assert_eq!(body["insertedId"], 10);

    let filters = json!([{"field": "name", "operator": "equals", "value": "Tablet"}]);
    let (_, page) = send(app, Method::POST, "/shop/products", Some(filters)).await;
    assert_eq!(page["total"], 1);
    assert_eq!(
        page["data"][0]["ReleasedAt"],
        json!({"$date": "2024-03-01T00:00:00.000Z"})
    );
}

#[tokio::test]
async fn test_insert_with_unparseable_date() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/shop/products/insert",
        Some(json!({"name": "Tablet", "ReleasedAt": "next spring"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_validation_failure_reports_details() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/shop/products/insert",
        Some(json!({"Price": 12})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    let details = &body["validationErrorDetails"];
    assert_eq!(details["operatorName"], "$jsonSchema");
    assert_eq!(
        details["schemaRulesNotSatisfied"][0]["missingProperties"],
        json!(["name"])
    );
}

#[tokio::test]
async fn test_update_then_delete() {
    let app = app();

    let (status, body) = send(
        app.clone(),
        Method::PUT,
        "/shop/products/2",
        Some(json!({"Price": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 1);

    let (status, body) = send(app.clone(), Method::DELETE, "/shop/products/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, body) = send(app.clone(), Method::DELETE, "/shop/products/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 0);

    let (_, page) = send(app, Method::POST, "/shop/products", None).await;
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn test_ids_named_like_static_segments() {
    let target = CollectionRef::new("shop", "notes");
    let app = router(MemoryStore::new().with_documents(
        &target,
        vec![
            json!({"_id": "insert", "text": "a"}),
            json!({"_id": "schema", "text": "b"}),
        ],
    ));

    let (status, body) = send(
        app.clone(),
        Method::PUT,
        "/shop/notes/schema",
        Some(json!({"text": "c"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let (status, body) = send(app.clone(), Method::DELETE, "/shop/notes/insert", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (_, page) = send(app, Method::POST, "/shop/notes", None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0], json!({"_id": "schema", "text": "c"}));
}

#[tokio::test]
async fn test_update_missing_document() {
    let (status, body) = send(
        app(),
        Method::PUT,
        "/shop/products/99",
        Some(json!({"Price": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 0);
    assert_eq!(body["modifiedCount"], 0);
}

#[tokio::test]
async fn test_list_databases_hides_system_databases() {
    let (status, body) = send(app(), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"databaseName": "shop", "collections": ["products"]}])
    );
}
