//! # Filter Subsystem
//!
//! Operator table and filter compiler. Converts untyped, string-based
//! filter descriptors into typed predicates combined by logical AND.
//!
//! Compilation is pure and happens before any store call, so a bad
//! operator or value never produces a partial pipeline.

mod compiler;
mod descriptor;
mod errors;
mod operator;

pub use compiler::FilterCompiler;
pub use descriptor::FilterDescriptor;
pub use errors::{CompileError, CompileResult};
pub use operator::FilterOperator;
