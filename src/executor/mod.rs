//! Pipeline Executor subsystem
//!
//! Submits a composed pipeline to the document store and unwraps the
//! single fan-out record into a `PageResult`.
//!
//! # Guarantees
//!
//! - Compile errors are returned before any store call
//! - One store request per query; data and total come from the same snapshot
//! - An empty count branch is reported as `total = 0`

mod errors;
mod executor;
mod result;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::PipelineExecutor;
pub use result::PageResult;
