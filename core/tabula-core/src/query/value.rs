//! Scalar values carried by conditions, entities and model instances.

use crate::error::{TabulaError, TabulaResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;

/// A field value.
///
/// `DateTime` only exists in memory: on the wire timestamps travel as
/// canonical ISO-8601 strings (see [`format_timestamp`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
}

/// Canonical ISO-8601 form: millisecond precision, `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the wire form of a timestamp. Accepts any RFC 3339 offset.
pub fn parse_timestamp(text: &str) -> TabulaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TabulaError::InvalidArguments(format!("invalid timestamp '{text}': {e}")))
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wire form: timestamps become ISO strings, recursively for lists.
    pub fn into_wire(self) -> Value {
        match self {
            Value::DateTime(ts) => Value::String(format_timestamp(&ts)),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_wire).collect()),
            other => other,
        }
    }

    /// Literal in the store's filter syntax.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format!("{v}"),
            Value::String(v) => format!("'{}'", v.replace('\'', "''")),
            Value::DateTime(v) => format!("datetime'{}'", format_timestamp(v)),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_literal).collect();
                format!("({})", parts.join(", "))
            }
        }
    }

    /// Ordering used by filter evaluation. Values of unrelated types do not compare.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::String(b)) => Some(format_timestamp(a).cmp(b)),
            (Value::String(a), Value::DateTime(b)) => Some(a.cmp(&format_timestamp(b))),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::DateTime(v) => serde_json::Value::String(format_timestamp(v)),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Nested objects have no column representation; they are kept as JSON text.
    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::String(obj.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_matches_iso_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T03:04:05.000Z");
        assert_eq!(parse_timestamp("2024-01-02T03:04:05.000Z").unwrap(), ts);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn string_literal_escapes_quotes() {
        assert_eq!(Value::from("O'Brien").to_literal(), "'O''Brien'");
        assert_eq!(Value::from(42).to_literal(), "42");
        assert_eq!(Value::from(true).to_literal(), "true");
    }

    #[test]
    fn mixed_numeric_compare() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Int(2).compare(&Value::from("2")), None);
    }

    #[test]
    fn wire_form_flattens_timestamps() {
        let ts = Utc.with_ymd_and_hms(2020, 5, 6, 7, 8, 9).unwrap();
        let wire = Value::List(vec![Value::DateTime(ts)]).into_wire();
        assert_eq!(wire, Value::List(vec![Value::from("2020-05-06T07:08:09.000Z")]));
    }

    #[test]
    fn json_round_trip_keeps_scalars() {
        let json = serde_json::json!({"a": 1, "b": [true, "x"], "c": 1.5});
        let obj = json.as_object().unwrap();
        assert_eq!(Value::from_json(obj["a"].clone()), Value::Int(1));
        assert_eq!(Value::from_json(obj["c"].clone()).to_json(), obj["c"]);
        assert_eq!(
            Value::from_json(obj["b"].clone()),
            Value::List(vec![Value::Bool(true), Value::from("x")])
        );
    }
}
