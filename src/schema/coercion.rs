//! Write-path date coercion.
//!
//! Fields the collection validator declares as `date` are converted from
//! their textual or numeric request form into extended-JSON dates
//! (`{"$date": "2024-01-01T00:00:00.000Z"}`) before the write is sent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::ValidatorSchema;
use crate::store::Document;

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts declared date fields of a write body in place
pub struct DateCoercer;

impl DateCoercer {
    /// Coerce every top-level date field present in `document`.
    ///
    /// Values already in `{"$date": ..}` form and nulls are left alone.
    pub fn coerce(document: &mut Document, schema: &ValidatorSchema) -> SchemaResult<()> {
        for field in schema.date_fields() {
            let Some(value) = document.get_mut(field) else {
                continue;
            };
            if value.is_null() || is_extended_date(value) {
                continue;
            }

            let parsed =
                parse_date(value).ok_or_else(|| SchemaError::invalid_date(field, value))?;
            *value = to_extended_json(&parsed);
        }

        Ok(())
    }
}

/// Render a timestamp as an extended-JSON date
pub fn to_extended_json(at: &DateTime<Utc>) -> Value {
    json!({ "$date": at.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

fn is_extended_date(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.len() == 1 && obj.contains_key("$date"))
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_DATETIME_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ValidatorSchema {
        let validator = json!({
            "$jsonSchema": {
                "properties": {
                    "ReleasedAt": {"bsonType": "date"},
                    "SeenAt": {"bsonType": ["date", "null"]},
                    "Name": {"bsonType": "string"}
                }
            }
        });
        ValidatorSchema::from_validator(Some(&validator))
    }

    fn body(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_rfc3339_is_normalised_to_utc() {
        let mut doc = body(json!({"ReleasedAt": "2024-03-01T12:30:00+02:00", "Name": "x"}));
        DateCoercer::coerce(&mut doc, &schema()).unwrap();

        assert_eq!(doc["ReleasedAt"], json!({"$date": "2024-03-01T10:30:00.000Z"}));
        assert_eq!(doc["Name"], json!("x"));
    }

    #[test]
    fn test_naive_forms_are_utc() {
        let mut doc = body(json!({
            "ReleasedAt": "2024-03-01T08:15:00.250",
            "SeenAt": "2024-03-02"
        }));
        DateCoercer::coerce(&mut doc, &schema()).unwrap();

        assert_eq!(doc["ReleasedAt"], json!({"$date": "2024-03-01T08:15:00.250Z"}));
        assert_eq!(doc["SeenAt"], json!({"$date": "2024-03-02T00:00:00.000Z"}));
    }

    #[test]
    fn test_epoch_millis() {
        let mut doc = body(json!({"ReleasedAt": 86_400_000}));
        DateCoercer::coerce(&mut doc, &schema()).unwrap();
        assert_eq!(doc["ReleasedAt"], json!({"$date": "1970-01-02T00:00:00.000Z"}));
    }

    #[test]
    fn test_existing_dates_and_nulls_untouched() {
        let mut doc = body(json!({
            "ReleasedAt": {"$date": "2020-01-01T00:00:00.000Z"},
            "SeenAt": null
        }));
        let before = doc.clone();
        DateCoercer::coerce(&mut doc, &schema()).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_absent_fields_are_skipped() {
        let mut doc = body(json!({"Name": "2024-01-01"}));
        DateCoercer::coerce(&mut doc, &schema()).unwrap();
        assert_eq!(doc["Name"], json!("2024-01-01"));
    }

    #[test]
    fn test_unparseable_value_fails() {
        let mut doc = body(json!({"ReleasedAt": "next tuesday"}));
        let err = DateCoercer::coerce(&mut doc, &schema()).unwrap_err();
        assert_eq!(err.field(), Some("ReleasedAt"));

        let mut doc = body(json!({"ReleasedAt": 1.5}));
        assert!(DateCoercer::coerce(&mut doc, &schema()).is_err());

        let mut doc = body(json!({"ReleasedAt": true}));
        assert!(DateCoercer::coerce(&mut doc, &schema()).is_err());
    }

    #[test]
    fn test_empty_schema_is_noop() {
        let mut doc = body(json!({"ReleasedAt": "garbage"}));
        DateCoercer::coerce(&mut doc, &ValidatorSchema::default()).unwrap();
        assert_eq!(doc["ReleasedAt"], json!("garbage"));
    }
}
