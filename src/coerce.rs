//! Soft conversions from wire primitives to native values.
//!
//! Both helpers are tolerant of malformed input: when a value cannot be
//! converted it is handed back unchanged, and callers downstream must be
//! ready to receive it uncoerced.

use chrono::{Local, TimeZone};

use crate::value::Value;

/// Converts epoch milliseconds (as sent by `Date.getTime()` in a browser)
/// into a local timestamp.
///
/// Integers, integral strings and finite floats are accepted. Anything else,
/// including values outside the representable calendar range, is returned
/// as is.
///
/// # Examples
///
/// ```
/// use resource_fields::{epoch_millis_to_time, Value};
///
/// let converted = epoch_millis_to_time(Value::Int(0));
/// assert!(matches!(converted, Value::Timestamp(t) if t.timestamp() == 0));
///
/// let untouched = epoch_millis_to_time(Value::from("not-a-number"));
/// assert_eq!(untouched, Value::from("not-a-number"));
/// ```
pub fn epoch_millis_to_time(value: Value) -> Value {
    let millis = match &value {
        Value::Int(ms) => Some(*ms),
        Value::Float(ms) if ms.is_finite() => Some(ms.trunc() as i64),
        Value::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    millis
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map_or(value, Value::Timestamp)
}

/// Splits a comma-delimited string into a list of strings.
///
/// Values that are not strings are returned as is.
///
/// # Examples
///
/// ```
/// use resource_fields::{delimited_string_to_list, Value};
///
/// let list = delimited_string_to_list(Value::from("a,b,c"));
/// assert_eq!(
///     list,
///     Value::List(vec![Value::from("a"), Value::from("b"), Value::from("c")])
/// );
/// assert_eq!(delimited_string_to_list(Value::Int(42)), Value::Int(42));
/// ```
pub fn delimited_string_to_list(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::List(s.split(',').map(Value::from).collect()),
        other => other,
    }
}
