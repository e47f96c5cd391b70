//! Document validation against a collection's `$jsonSchema`.
//!
//! Validation semantics:
//! - Every name in `required` is present
//! - Every present property with a declared `bsonType` has a matching type
//! - Undeclared fields are allowed
//!
//! All failing rules are reported together, in the structured form
//! document stores return with a validation rejection.

use serde_json::{json, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{type_name, ValidatorSchema};
use crate::store::Document;

/// Checks documents against a validator schema.
///
/// Validator does not mutate documents.
/// Validation is deterministic: properties are checked in name order.
pub struct SchemaValidator<'a> {
    schema: &'a ValidatorSchema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a ValidatorSchema) -> Self {
        Self { schema }
    }

    /// Validates a complete document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` with code `VALIDATION_FAILED` whose details
    /// list every rule the document does not satisfy.
    pub fn validate_document(&self, document: &Document) -> SchemaResult<()> {
        let mut rules = Vec::new();

        let missing = self.schema.missing_required(document);
        if !missing.is_empty() {
            rules.push(json!({
                "operatorName": "required",
                "specifiedAs": { "required": self.schema.required },
                "missingProperties": missing,
            }));
        }

        let mismatched: Vec<Value> = self
            .schema
            .properties
            .iter()
            .filter_map(|(name, prop)| {
                let value = document.get(name)?;
                if prop.accepts(value) {
                    return None;
                }
                Some(json!({
                    "propertyName": name,
                    "details": [{
                        "operatorName": "bsonType",
                        "specifiedAs": { "bsonType": prop.specified_as },
                        "reason": "type did not match",
                        "consideredValue": value,
                        "consideredType": type_name(value),
                    }],
                }))
            })
            .collect();

        if !mismatched.is_empty() {
            rules.push(json!({
                "operatorName": "properties",
                "propertiesNotSatisfied": mismatched,
            }));
        }

        if rules.is_empty() {
            return Ok(());
        }

        Err(SchemaError::validation_failed(json!({
            "operatorName": "$jsonSchema",
            "schemaRulesNotSatisfied": rules,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;

    fn schema() -> ValidatorSchema {
        let validator = json!({
            "$jsonSchema": {
                "required": ["Name", "Price"],
                "properties": {
                    "Name": {"bsonType": "string"},
                    "Price": {"bsonType": ["double", "int"]},
                    "ReleasedAt": {"bsonType": "date"}
                }
            }
        });
        ValidatorSchema::from_validator(Some(&validator))
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_document_passes() {
        let schema = schema();
        let validator = SchemaValidator::new(&schema);
        let result = validator.validate_document(&doc(json!({
            "Name": "iPhone",
            "Price": 999,
            "ReleasedAt": {"$date": "2023-09-22T00:00:00.000Z"},
            "Extra": [1, 2]
        })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let schema = schema();
        let validator = SchemaValidator::new(&schema);
        let err = validator
            .validate_document(&doc(json!({"Name": "iPhone"})))
            .unwrap_err();

        assert_eq!(err.code(), SchemaErrorCode::ValidationFailed);
        let details = err.details().unwrap();
        assert_eq!(details["operatorName"], "$jsonSchema");
        let rule = &details["schemaRulesNotSatisfied"][0];
        assert_eq!(rule["operatorName"], "required");
        assert_eq!(rule["missingProperties"], json!(["Price"]));
    }

    #[test]
    fn test_type_mismatch_fails() {
        let schema = schema();
        let validator = SchemaValidator::new(&schema);
        let err = validator
            .validate_document(&doc(json!({
                "Name": "iPhone",
                "Price": "cheap",
                "ReleasedAt": "2023-09-22"
            })))
            .unwrap_err();

        let rule = &err.details().unwrap()["schemaRulesNotSatisfied"][0];
        assert_eq!(rule["operatorName"], "properties");
        let props = rule["propertiesNotSatisfied"].as_array().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0]["propertyName"], "Price");
        assert_eq!(props[0]["details"][0]["consideredType"], "string");
        assert_eq!(
            props[0]["details"][0]["specifiedAs"],
            json!({"bsonType": ["double", "int"]})
        );
        assert_eq!(props[1]["propertyName"], "ReleasedAt");
    }

    #[test]
    fn test_reports_every_failing_rule() {
        let schema = schema();
        let validator = SchemaValidator::new(&schema);
        let err = validator
            .validate_document(&doc(json!({"Price": false})))
            .unwrap_err();
        let rules = err.details().unwrap()["schemaRulesNotSatisfied"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(rules, 2);
    }

    #[test]
    fn test_empty_schema_accepts_anything() {
        let schema = ValidatorSchema::default();
        let validator = SchemaValidator::new(&schema);
        assert!(validator.validate_document(&doc(json!({"a": null}))).is_ok());
    }
}
