//! Pipeline executor
//!
//! Execution flow (strict order):
//! 1. Compose the pipeline; compile errors stop here with no store call
//! 2. Submit the whole pipeline as one store request
//! 3. Unwrap the single fan-out record into a page and a total

use std::sync::Arc;

use tracing::{debug, error, info};

use super::errors::ExecutorResult;
use super::result::PageResult;
use crate::pipeline::{Pipeline, PipelineComposer, QueryRequest};
use crate::store::{CollectionRef, DocumentStore};

/// Runs query pipelines against a shared document store
#[derive(Clone)]
pub struct PipelineExecutor {
    store: Arc<dyn DocumentStore>,
}

impl PipelineExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Compose and execute a query request
    pub async fn run(
        &self,
        target: &CollectionRef,
        request: &QueryRequest,
    ) -> ExecutorResult<PageResult> {
        let pipeline = PipelineComposer::compose(request)?;
        info!(
            collection = %target,
            stages = pipeline.len(),
            filters = request.filters.len(),
            "compiled query"
        );
        self.execute(target, &pipeline).await
    }

    /// Execute an already composed pipeline
    pub async fn execute(
        &self,
        target: &CollectionRef,
        pipeline: &Pipeline,
    ) -> ExecutorResult<PageResult> {
        debug!(collection = %target, pipeline = %pipeline.to_json(), "submitting pipeline");

        let records = self.store.aggregate(target, pipeline).await.map_err(|e| {
            error!(collection = %target, error = %e, "pipeline failed");
            e
        })?;

        let page = PageResult::from_fan_out(records.into_iter().next())?;
        debug!(collection = %target, returned = page.len(), total = page.total, "pipeline finished");
        Ok(page)
    }
}
