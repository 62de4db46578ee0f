//! Employee record model and the loose payload coercion rules.
//!
//! Payloads arrive as arbitrary JSON objects; fields are coerced rather than
//! validated. The coercion intentionally mirrors a dynamic-language integer
//! cast: floats truncate, numeric string prefixes parse, everything else
//! collapses to 0.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type EmployeeId = i64;

/// One employee entry as persisted: both fields always present, both nullable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub name: Option<String>,
    pub age: Option<i64>,
}

/// The full persisted collection. Serialized as a single JSON object with
/// string-encoded integer keys, e.g. `{"7":{"name":"James Bond","age":27}}`.
pub type EmployeeStore = BTreeMap<EmployeeId, EmployeeRecord>;

/// JSON payload of a POST/PUT body. Non-object bodies become an empty map.
pub type Payload = Map<String, Value>;

impl EmployeeRecord {
    /// Build a fresh record from a POST payload.
    ///
    /// A missing field stays null. A present `age` is always integer-coerced,
    /// so `"age": null` stores 0, not null.
    pub fn from_payload(payload: &Payload) -> Self {
        Self {
            name: payload.get("name").and_then(coerce_name),
            age: payload.get("age").map(coerce_int),
        }
    }

    /// Merge a PUT payload over this record, field by field.
    ///
    /// A field named in the payload wins; a field absent from the payload
    /// keeps its stored value. This is a partial update, not a replace.
    pub fn merged_with(&self, payload: &Payload) -> Self {
        Self {
            name: match payload.get("name") {
                Some(value) => coerce_name(value),
                None => self.name.clone(),
            },
            age: match payload.get("age") {
                Some(value) => Some(coerce_int(value)),
                None => self.age,
            },
        }
    }
}

/// Coerce any JSON value to an integer, cast-style.
///
/// Numbers truncate toward zero, booleans map to 1/0, strings parse an
/// optional sign plus leading decimal digits (`"12abc"` -> 12). Anything
/// else, including null and non-numeric strings, yields 0.
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => parse_int_prefix(s),
        _ => 0,
    }
}

/// Coerce a JSON value to an optional name. Only strings survive; null and
/// every other type become null.
pub fn coerce_name(value: &Value) -> Option<String> {
    value.as_str().map(ToString::to_string)
}

/// Parse the leading integer of a string: optional whitespace, optional
/// sign, then decimal digits. No digits means 0.
fn parse_int_prefix(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }

    // Saturate on overflow rather than wrap.
    digits.parse::<i64>().map_or(
        if sign < 0 { i64::MIN } else { i64::MAX },
        |n| n.saturating_mul(sign),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be a JSON object"),
        }
    }

    #[test]
    fn test_coerce_int_numbers() {
        assert_eq!(coerce_int(&json!(27)), 27);
        assert_eq!(coerce_int(&json!(-4)), -4);
        assert_eq!(coerce_int(&json!(12.9)), 12);
        assert_eq!(coerce_int(&json!(-12.9)), -12);
    }

    #[test]
    fn test_coerce_int_strings() {
        assert_eq!(coerce_int(&json!("27")), 27);
        assert_eq!(coerce_int(&json!("12abc")), 12);
        assert_eq!(coerce_int(&json!("  -3")), -3);
        assert_eq!(coerce_int(&json!("abc")), 0);
        assert_eq!(coerce_int(&json!("")), 0);
    }

    #[test]
    fn test_coerce_int_other_types() {
        assert_eq!(coerce_int(&json!(true)), 1);
        assert_eq!(coerce_int(&json!(false)), 0);
        assert_eq!(coerce_int(&Value::Null), 0);
        assert_eq!(coerce_int(&json!([1, 2])), 0);
        assert_eq!(coerce_int(&json!({"a": 1})), 0);
    }

    #[test]
    fn test_from_payload_full() {
        let record = EmployeeRecord::from_payload(&payload(json!({
            "employeeId": 7,
            "name": "James Bond",
            "age": 27
        })));
        assert_eq!(record.name.as_deref(), Some("James Bond"));
        assert_eq!(record.age, Some(27));
    }

    #[test]
    fn test_from_payload_missing_fields_stay_null() {
        let record = EmployeeRecord::from_payload(&payload(json!({"employeeId": 7})));
        assert_eq!(record, EmployeeRecord { name: None, age: None });
    }

    #[test]
    fn test_from_payload_null_age_coerces_to_zero() {
        let record = EmployeeRecord::from_payload(&payload(json!({
            "name": null,
            "age": null
        })));
        assert_eq!(record.name, None);
        assert_eq!(record.age, Some(0));
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let stored = EmployeeRecord {
            name: Some("A".to_string()),
            age: Some(1),
        };
        let merged = stored.merged_with(&payload(json!({"age": 2})));
        assert_eq!(merged.name.as_deref(), Some("A"));
        assert_eq!(merged.age, Some(2));
    }

    #[test]
    fn test_merge_empty_payload_is_identity_on_values() {
        let stored = EmployeeRecord {
            name: Some("A".to_string()),
            age: Some(1),
        };
        assert_eq!(stored.merged_with(&Payload::new()), stored);
    }

    #[test]
    fn test_store_serializes_with_string_keys() {
        let mut store = EmployeeStore::new();
        store.insert(
            7,
            EmployeeRecord {
                name: Some("James Bond".to_string()),
                age: Some(27),
            },
        );
        let json = serde_json::to_string(&store).expect("serialize");
        assert_eq!(json, r#"{"7":{"name":"James Bond","age":27}}"#);

        let back: EmployeeStore = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, store);
    }
}
