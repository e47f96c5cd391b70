//! # Filter Compiler
//!
//! Turns an ordered list of filter descriptors into at most one match
//! stage holding the conjunction of their predicates.

use super::descriptor::FilterDescriptor;
use super::errors::CompileResult;
use crate::pipeline::{FieldPredicate, Stage};

/// Compiles filter descriptors into a match stage
pub struct FilterCompiler;

impl FilterCompiler {
    /// Compile every descriptor, in order.
    ///
    /// Returns `None` for an empty list: no match stage is emitted at all.
    /// The first failing descriptor aborts the whole batch.
    pub fn compile(descriptors: &[FilterDescriptor]) -> CompileResult<Option<Stage>> {
        let predicates = Self::predicates(descriptors)?;

        if predicates.is_empty() {
            return Ok(None);
        }

        Ok(Some(Stage::Match(predicates)))
    }

    /// Compile descriptors into predicates without wrapping them in a stage
    pub fn predicates(descriptors: &[FilterDescriptor]) -> CompileResult<Vec<FieldPredicate>> {
        descriptors.iter().map(FilterDescriptor::compile).collect()
    }
}
