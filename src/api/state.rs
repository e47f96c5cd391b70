//! Shared handler state

use std::sync::Arc;

use crate::executor::PipelineExecutor;
use crate::store::DocumentStore;

/// State shared across handlers: one store handle for the process lifetime
#[derive(Clone)]
pub struct AppState {
    pub executor: PipelineExecutor,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            executor: PipelineExecutor::new(store),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.executor.store().as_ref()
    }
}
