//! Value ordering for sort stages.
//!
//! Ordering rules:
//! - missing = null < number < string < object < array < bool < date
//! - For same types, natural ordering
//! - Numbers compare by value regardless of integer/float representation

use std::cmp::Ordering;

use serde_json::Value;

/// Extended-JSON date payload of a value, if it is one
pub fn as_date(value: &Value) -> Option<&str> {
    match value {
        Value::Object(obj) if obj.len() == 1 => obj.get("$date").and_then(Value::as_str),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(v @ Value::Object(_)) if as_date(v).is_some() => 6,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compare two optional values for sorting
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a_rank = type_rank(a);
    let b_rank = type_rank(b);

    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }

    match (a, b) {
        (Some(Value::Number(a_n)), Some(Value::Number(b_n))) => {
            let a_f = a_n.as_f64().unwrap_or(0.0);
            let b_f = b_n.as_f64().unwrap_or(0.0);
            a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a_s)), Some(Value::String(b_s))) => a_s.cmp(b_s),
        (Some(Value::Bool(a_b)), Some(Value::Bool(b_b))) => a_b.cmp(b_b),
        (Some(a_v @ Value::Object(_)), Some(b_v @ Value::Object(_))) => {
            match (as_date(a_v), as_date(b_v)) {
                // RFC 3339 UTC timestamps with fixed precision sort lexically
                (Some(a_d), Some(b_d)) => a_d.cmp(b_d),
                _ => Ordering::Equal,
            }
        }
        (Some(Value::Array(a_arr)), Some(Value::Array(b_arr))) => {
            for (x, y) in a_arr.iter().zip(b_arr.iter()) {
                let ordering = compare_values(Some(x), Some(y));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a_arr.len().cmp(&b_arr.len())
        }
        _ => Ordering::Equal,
    }
}
