//! docquery - filter, search and paginate document collections over HTTP
//!
//! A request carries a JSON array of filter descriptors plus optional
//! search, sort and paging parameters. The `filter` module compiles the
//! descriptors into predicates, `pipeline` assembles them into an
//! aggregation pipeline, and `executor` runs it against a `DocumentStore`.

pub mod api;
pub mod cli;
pub mod config;
pub mod executor;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod store;
