//! # Query Pipeline
//!
//! Typed model of the stages submitted to a document store, the search
//! clause builder, and the composer that fixes stage order.
//!
//! # Stage order
//!
//! search → match → sort → page-and-count. Search runs first because the
//! text index covers the raw collection; counting happens last so `total`
//! reflects search and filters but not pagination.

mod composer;
mod render;
mod search;
mod stage;

pub use composer::{
    Pagination, PipelineComposer, QueryRequest, RawQueryParams, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
pub use render::{COUNT_BRANCH, DATA_BRANCH, TOTAL_FIELD};
pub use search::SearchClause;
pub use stage::{
    FieldPredicate, PageWindow, Pipeline, Predicate, PredicateValue, SortDirection, SortSpec,
    Stage, StageKind,
};
