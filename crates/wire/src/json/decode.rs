//! Parsing JSON text back into values

use std::collections::HashMap;

use thiserror::Error;
use tracedoc_core::{SpecialFloatKind, Value};

use super::F64_WRAPPER;

/// Decode error types
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Invalid JSON syntax
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Integer outside the 64-bit signed range
    #[error("integer out of range: {0}")]
    IntegerOutOfRange(String),

    /// Invalid value in $f64 wrapper
    #[error("invalid $f64 value: {0}")]
    InvalidF64Wrapper(String),
}

impl From<DecodeError> for tracedoc_core::Error {
    fn from(e: DecodeError) -> Self {
        tracedoc_core::Error::malformed(None, e.to_string())
    }
}

/// Parse JSON text into a value
pub fn from_json_str(json: &str) -> Result<Value, DecodeError> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    from_json_value(parsed)
}

/// Convert a `serde_json` tree into a value
pub fn from_json_value(json: serde_json::Value) -> Result<Value, DecodeError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if n.is_f64() {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| DecodeError::InvalidJson(n.to_string()))
            } else {
                n.as_i64()
                    .map(Value::Int)
                    .ok_or_else(|| DecodeError::IntegerOutOfRange(n.to_string()))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(from_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => {
            if let Some(f) = unwrap_special(&map)? {
                return Ok(Value::Float(f));
            }
            let mut object = HashMap::with_capacity(map.len());
            for (k, v) in map {
                object.insert(k, from_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
    }
}

// A single-key object `{"$f64": "<kind>"}` is a wrapped float. Any other
// shape is an ordinary object, even if it has a `$f64` key.
fn unwrap_special(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<Option<f64>, DecodeError> {
    if map.len() != 1 {
        return Ok(None);
    }
    match map.get(F64_WRAPPER) {
        Some(serde_json::Value::String(s)) => SpecialFloatKind::from_wire_string(s)
            .map(|kind| Some(kind.to_f64()))
            .ok_or_else(|| DecodeError::InvalidF64Wrapper(s.clone())),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats_stay_distinct() {
        assert_eq!(from_json_str("3").unwrap(), Value::Int(3));
        assert_eq!(from_json_str("3.0").unwrap(), Value::Float(3.0));
        assert_eq!(from_json_str("-9").unwrap(), Value::Int(-9));
    }

    #[test]
    fn integer_beyond_i64_is_rejected() {
        let err = from_json_str("18446744073709551615").unwrap_err();
        assert!(matches!(err, DecodeError::IntegerOutOfRange(_)));
    }

    #[test]
    fn special_float_wrappers() {
        match from_json_str(r#"{"$f64":"NaN"}"#).unwrap() {
            Value::Float(f) => assert!(f.is_nan()),
            other => panic!("expected float, got {:?}", other),
        }
        match from_json_str(r#"{"$f64":"-0.0"}"#).unwrap() {
            Value::Float(f) => assert!(f == 0.0 && f.is_sign_negative()),
            other => panic!("expected float, got {:?}", other),
        }
        assert_eq!(
            from_json_str(r#"{"$f64":"-Inf"}"#).unwrap(),
            Value::Float(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn unknown_wrapper_value_is_an_error() {
        let err = from_json_str(r#"{"$f64":"inf"}"#).unwrap_err();
        assert_eq!(err, DecodeError::InvalidF64Wrapper("inf".into()));
    }

    #[test]
    fn wrapper_lookalikes_are_plain_objects() {
        let v = from_json_str(r#"{"$f64":1}"#).unwrap();
        assert_eq!(v, Value::object([("$f64", Value::Int(1))]));

        let v = from_json_str(r#"{"$f64":"NaN","extra":true}"#).unwrap();
        assert!(matches!(v, Value::Object(ref o) if o.len() == 2));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(
            from_json_str("{\"a\":"),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(from_json_str(""), Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn converts_into_malformed_payload() {
        let err: tracedoc_core::Error = DecodeError::InvalidJson("eof".into()).into();
        assert!(matches!(
            err,
            tracedoc_core::Error::MalformedStoredPayload { storage_id: None, .. }
        ));
    }
}
