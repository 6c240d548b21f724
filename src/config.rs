//! Loosely typed configuration readers
//!
//! Executor and retry settings can be supplied as JSON objects. The helpers
//! here map a wrongly typed value to [`Error::TypeError`] and leave domain
//! checks (ranges, known names) to the caller.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Name of a JSON value's type, used in type error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrow the value as an object, or fail with a type error
pub(crate) fn as_object<'a>(field: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::type_error(field, "object", type_name(value)))
}

/// Look up the first present key among `names`; explicit `null` counts as absent
pub(crate) fn lookup<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !value.is_null())
}

/// Read an integral number. `3.0` is accepted, `2.5` is not.
pub(crate) fn read_integer(field: &str, value: &Value) -> Result<i64> {
    let Value::Number(number) = value else {
        return Err(Error::type_error(field, "integer", type_name(value)));
    };
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(Error::type_error(field, "integer", "non-integral number")),
    }
}

/// Read any finite number
pub(crate) fn read_number(field: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .ok_or_else(|| Error::type_error(field, "number", type_name(value)))
}

/// Read a string
pub(crate) fn read_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::type_error(field, "string", type_name(value)))
}
