//! HTTP API
//!
//! Thin framing over the query core and the document store:
//!
//! - `POST /:database/:collection` runs a filtered, searched, paginated query
//! - `GET /:database/:collection/schema` returns the collection validator
//! - `POST /:database/:collection/insert`, `PUT|DELETE /:database/:collection/:id`
//!   write single documents, coercing declared date fields first
//! - `GET /` lists databases and their collections
//!
//! Failures become `{status, message, validationErrorDetails?}`.

mod config;
mod errors;
mod routes;
mod server;
mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorBody};
pub use routes::{collection_routes, health_routes, parse_document, parse_filters};
pub use server::HttpServer;
pub use state::AppState;
