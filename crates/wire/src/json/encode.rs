//! Rendering of values as JSON text
//!
//! Objects render with sorted keys, so equal values always produce equal
//! text. Floats JSON cannot carry use the `$f64` wrapper.

use serde_json::{Map, Number};
use tracedoc_core::{SpecialFloatKind, Value};

use super::F64_WRAPPER;

/// Convert a value into a `serde_json` tree
pub fn to_json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
        Value::Float(f) => encode_float(*f),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(to_json_value).collect()),
        Value::Object(obj) => {
            // Insert in key order so the output is sorted whichever map
            // backend serde_json was built with
            let mut entries: Vec<_> = obj.iter().collect();
            entries.sort_by_key(|(k, _)| *k);
            let map: Map<String, serde_json::Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), to_json_value(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

fn encode_float(f: f64) -> serde_json::Value {
    match SpecialFloatKind::classify(f) {
        Some(kind) => wrap_special(kind),
        None => Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| wrap_special(SpecialFloatKind::NaN)),
    }
}

fn wrap_special(kind: SpecialFloatKind) -> serde_json::Value {
    let mut map = Map::new();
    map.insert(
        F64_WRAPPER.to_string(),
        serde_json::Value::String(kind.to_wire_string().to_string()),
    );
    serde_json::Value::Object(map)
}

/// Render a value as compact JSON text
pub fn to_json_string(value: &Value) -> String {
    to_json_value(value).to_string()
}

/// Render a value as indented JSON text
pub fn to_json_pretty(value: &Value) -> String {
    format!("{:#}", to_json_value(value))
}
