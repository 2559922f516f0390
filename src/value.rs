//! Native values held by backing objects, and their wire representation.
//!
//! The wire side is plain `serde_json`. The native side is [`Value`], which
//! adds a timestamp variant so temporal attributes keep their calendar type
//! on the backing object.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::{Map, Number, Value as JsonValue};

use crate::coerce::epoch_millis_to_time;
use crate::error::{Error, Result};

/// The wire mapping exchanged with callers: wire key to JSON value.
pub type WireMap = Map<String, JsonValue>;

/// A native attribute value on a backing object.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Text(String),
    /// Local calendar timestamp
    Timestamp(DateTime<Local>),
    /// Ordered list of values
    List(Vec<Value>),
    /// String-keyed mapping of values
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string slice if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Structural conversion from a wire value.
    pub fn from_wire(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_wire).collect()),
            JsonValue::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_wire(v)))
                    .collect(),
            ),
        }
    }

    /// Structural conversion to a wire value.
    ///
    /// Timestamps become epoch milliseconds; non-finite floats become null.
    pub fn to_wire(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Timestamp(t) => JsonValue::Number(t.timestamp_millis().into()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_wire).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            other => write!(f, "{}", other.to_wire()),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from_wire(&json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(t: DateTime<Local>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// The declared type a field coerces its values with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Boolean flag
    Bool,
    /// Integer
    Int,
    /// Floating point number
    Float,
    /// String
    Text,
    /// Timestamp, accepted on the wire as epoch milliseconds
    DateTime,
    /// No coercion
    Raw,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Text => write!(f, "text"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Raw => write!(f, "raw"),
        }
    }
}

impl FieldType {
    /// Converts a native value to this type.
    ///
    /// Null is accepted by every type. `DateTime` coercion is soft: input
    /// that is not epoch milliseconds passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] when the value has no sensible
    /// representation in this type.
    pub fn coerce(self, value: Value) -> Result<Value> {
        if value.is_null() || self == FieldType::Raw {
            return Ok(value);
        }
        if self == FieldType::DateTime {
            return Ok(epoch_millis_to_time(value));
        }

        let converted = match (self, &value) {
            (FieldType::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
            (FieldType::Bool, Value::Int(i)) => Some(Value::Bool(*i != 0)),
            (FieldType::Bool, Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },

            (FieldType::Int, Value::Int(i)) => Some(Value::Int(*i)),
            (FieldType::Int, Value::Bool(b)) => Some(Value::Int(i64::from(*b))),
            (FieldType::Int, Value::Float(f))
                if f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(Value::Int(f.trunc() as i64))
            }
            (FieldType::Int, Value::Text(s)) => s.trim().parse().ok().map(Value::Int),

            (FieldType::Float, Value::Float(f)) => Some(Value::Float(*f)),
            (FieldType::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (FieldType::Float, Value::Text(s)) => s.trim().parse().ok().map(Value::Float),

            (FieldType::Text, Value::Text(s)) => Some(Value::Text(s.clone())),
            (
                FieldType::Text,
                Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Timestamp(_),
            ) => Some(Value::Text(value.to_string())),

            _ => None,
        };

        converted.ok_or_else(|| Error::Conversion {
            expected: self,
            found: value.to_wire().to_string(),
        })
    }

    /// Converts a wire value to a native value of this type.
    pub fn from_wire(self, json: &JsonValue) -> Result<Value> {
        self.coerce(Value::from_wire(json))
    }

    /// Converts a native value of this type to its wire value.
    pub fn to_wire(self, value: Value) -> Result<JsonValue> {
        self.coerce(value).map(|converted| converted.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn wire_round_trip_keeps_structure() {
        let json = json!({"a": [1, 2.5, "x", null, true], "b": {"c": "d"}});
        let value = Value::from_wire(&json);
        assert_eq!(value.to_wire(), json);
    }

    #[test]
    fn timestamp_goes_to_wire_as_millis() {
        let t = Local.timestamp_millis_opt(1_500).single().expect("valid timestamp");
        assert_eq!(Value::Timestamp(t).to_wire(), json!(1500));
    }

    #[test]
    fn int_coercion_accepts_numeric_strings() {
        assert_eq!(FieldType::Int.from_wire(&json!("20")), Ok(Value::Int(20)));
        assert_eq!(FieldType::Int.from_wire(&json!(20.9)), Ok(Value::Int(20)));
    }

    #[test]
    fn int_coercion_rejects_garbage() {
        let err = FieldType::Int.from_wire(&json!("abc")).unwrap_err();
        assert_eq!(
            err,
            Error::Conversion {
                expected: FieldType::Int,
                found: "\"abc\"".to_string()
            }
        );
    }

    #[test]
    fn null_coerces_to_null_for_every_type() {
        for ty in [
            FieldType::Bool,
            FieldType::Int,
            FieldType::Float,
            FieldType::Text,
            FieldType::DateTime,
            FieldType::Raw,
        ] {
            assert_eq!(ty.coerce(Value::Null), Ok(Value::Null));
        }
    }

    #[test]
    fn datetime_coercion_is_soft() {
        assert_eq!(
            FieldType::DateTime.from_wire(&json!("yesterday")),
            Ok(Value::Text("yesterday".to_string()))
        );
        let converted = FieldType::DateTime.from_wire(&json!(0)).expect("soft conversion");
        assert!(matches!(converted, Value::Timestamp(t) if t.timestamp() == 0));
    }

    #[test]
    fn text_coercion_renders_scalars() {
        assert_eq!(FieldType::Text.coerce(Value::Int(7)), Ok(Value::from("7")));
        assert_eq!(FieldType::Text.coerce(Value::Bool(true)), Ok(Value::from("true")));
    }

    #[test]
    fn to_wire_applies_declared_type() {
        assert_eq!(FieldType::Int.to_wire(Value::from("42")), Ok(json!(42)));
        assert!(FieldType::Int.to_wire(Value::List(vec![])).is_err());
    }
}
