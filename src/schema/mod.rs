//! Schema subsystem
//!
//! Collections may carry a `$jsonSchema` validator. The service reads it
//! for two purposes:
//!
//! - Coercing declared date fields on the write path
//! - Enforcing `required` and `bsonType` in the in-memory store
//!
//! A collection without a validator has an empty schema.

mod coercion;
mod errors;
mod types;
mod validator;

pub use coercion::{to_extended_json, DateCoercer};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use types::{type_name, DeclaredType, PropertySchema, ValidatorSchema};
pub use validator::SchemaValidator;
