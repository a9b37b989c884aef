//! JSON text form of values
//!
//! Used wherever a value leaves the process as text: the file store's
//! snapshots and the command-line tool. Non-JSON-native floats use a
//! wrapper object:
//!
//! | Value | JSON |
//! |-------|------|
//! | `Float(NaN)` | `{"$f64": "NaN"}` |
//! | `Float(+Inf)` | `{"$f64": "+Inf"}` |
//! | `Float(-Inf)` | `{"$f64": "-Inf"}` |
//! | `Float(-0.0)` | `{"$f64": "-0.0"}` |
//!
//! Everything else maps one-to-one onto JSON, with object keys sorted.

mod decode;
mod encode;

pub use decode::{from_json_str, from_json_value, DecodeError};
pub use encode::{to_json_pretty, to_json_string, to_json_value};

pub(crate) const F64_WRAPPER: &str = "$f64";
