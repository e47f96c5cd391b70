//! Collection validator model.
//!
//! Only the parts of a `$jsonSchema` validator the service acts on are
//! modelled: top-level `required` names and per-property `bsonType`.
//!
//! Recognised type names:
//! - double, int, long, decimal, number
//! - string, bool, date, null
//! - object, array, objectId
//!
//! Unrecognised names are kept and accept any value.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::store::Document;

/// A `bsonType` name declared on a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Double,
    Int,
    Long,
    Decimal,
    Number,
    String,
    Bool,
    Date,
    Null,
    Object,
    Array,
    ObjectId,
    Other(String),
}

impl DeclaredType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "double" => DeclaredType::Double,
            "int" => DeclaredType::Int,
            "long" => DeclaredType::Long,
            "decimal" => DeclaredType::Decimal,
            "number" => DeclaredType::Number,
            "string" => DeclaredType::String,
            "bool" => DeclaredType::Bool,
            "date" => DeclaredType::Date,
            "null" => DeclaredType::Null,
            "object" => DeclaredType::Object,
            "array" => DeclaredType::Array,
            "objectId" => DeclaredType::ObjectId,
            other => DeclaredType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeclaredType::Double => "double",
            DeclaredType::Int => "int",
            DeclaredType::Long => "long",
            DeclaredType::Decimal => "decimal",
            DeclaredType::Number => "number",
            DeclaredType::String => "string",
            DeclaredType::Bool => "bool",
            DeclaredType::Date => "date",
            DeclaredType::Null => "null",
            DeclaredType::Object => "object",
            DeclaredType::Array => "array",
            DeclaredType::ObjectId => "objectId",
            DeclaredType::Other(name) => name,
        }
    }

    /// Whether a stored value has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DeclaredType::Double | DeclaredType::Decimal | DeclaredType::Number => {
                value.is_number()
            }
            DeclaredType::Int | DeclaredType::Long => value.is_i64() || value.is_u64(),
            DeclaredType::String => value.is_string(),
            DeclaredType::Bool => value.is_boolean(),
            DeclaredType::Date => is_wrapped(value, "$date"),
            DeclaredType::Null => value.is_null(),
            DeclaredType::ObjectId => is_wrapped(value, "$oid"),
            DeclaredType::Object => {
                value.is_object() && !is_wrapped(value, "$date") && !is_wrapped(value, "$oid")
            }
            DeclaredType::Array => value.is_array(),
            DeclaredType::Other(_) => true,
        }
    }
}

/// Extended-JSON wrapper such as `{"$date": ...}`
fn is_wrapped(value: &Value, key: &str) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.len() == 1 && obj.contains_key(key))
}

/// Name of a stored value's type, for validation reports
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        v if is_wrapped(v, "$date") => "date",
        v if is_wrapped(v, "$oid") => "objectId",
        Value::Object(_) => "object",
    }
}

/// Declared types of one property
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertySchema {
    pub bson_types: Vec<DeclaredType>,
    /// The `bsonType` exactly as declared, for reports
    pub specified_as: Option<Value>,
}

impl PropertySchema {
    fn from_value(value: &Value) -> Self {
        let specified_as = value.get("bsonType").cloned();
        let bson_types = match &specified_as {
            Some(Value::String(name)) => vec![DeclaredType::from_name(name)],
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(DeclaredType::from_name)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            bson_types,
            specified_as,
        }
    }

    pub fn declares(&self, ty: &DeclaredType) -> bool {
        self.bson_types.contains(ty)
    }

    /// Whether a value satisfies the declared types. No declaration accepts anything.
    pub fn accepts(&self, value: &Value) -> bool {
        self.bson_types.is_empty() || self.bson_types.iter().any(|t| t.accepts(value))
    }
}

/// Schema derived from a collection's validator document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatorSchema {
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

impl ValidatorSchema {
    /// Read `$jsonSchema` from a validator. Anything missing yields an empty schema.
    pub fn from_validator(validator: Option<&Value>) -> Self {
        let Some(json_schema) = validator.and_then(|v| v.get("$jsonSchema")) else {
            return Self::default();
        };

        let properties = json_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| (name.clone(), PropertySchema::from_value(prop)))
                    .collect()
            })
            .unwrap_or_default();

        let required = json_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            properties,
            required,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.required.is_empty()
    }

    /// Properties declared with the `date` type
    pub fn date_fields(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.declares(&DeclaredType::Date))
            .map(|(name, _)| name.as_str())
    }

    /// Required names absent from a document
    pub fn missing_required(&self, document: &Document) -> Vec<String> {
        self.required
            .iter()
            .filter(|name| !document.contains_key(name.as_str()))
            .cloned()
            .collect()
    }
}
