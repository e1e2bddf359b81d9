//! Typed access to loosely-typed condition values.

use serde_json::Value;
use thiserror::Error;

/// A condition value that could not be read as the expected type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {expected} value: {value}")]
pub struct ValueParseError {
    pub expected: &'static str,
    pub value: String,
}

impl ValueParseError {
    fn integer(value: &Value) -> Self {
        Self {
            expected: "integer",
            value: value.to_string(),
        }
    }
}

/// Read an integer from a native integer, a float (truncated toward zero)
/// or a base-10 numeric string.
pub fn parse_int(value: &Value) -> Result<i64, ValueParseError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(ValueParseError::integer(value))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(|| ValueParseError::integer(value))
            }
        }
        Value::String(s) => s.parse::<i64>().map_err(|_| ValueParseError::integer(value)),
        _ => Err(ValueParseError::integer(value)),
    }
}

/// String entries of a list value. Non-string entries are skipped;
/// `None` when the value is not a list.
pub fn string_list(value: &Value) -> Option<Vec<&str>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
}

/// Truthiness of a flag condition; anything other than `true` is off.
pub fn flag(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
