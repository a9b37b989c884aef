//! Canonical encoder and text form for tracedoc
//!
//! Two halves:
//!
//! - [`encode`](mod@encode): turns Rust values into the canonical
//!   [`Value`] tree. Identifiers become hyphenated strings, temporal values
//!   ISO-8601 text, decimals their exact textual form, enumerations their
//!   scalar, sets and lazy sequences arrays, rows mappings.
//! - [`json`]: renders a [`Value`] as JSON text with sorted keys and parses
//!   it back, using `{"$f64": "..."}` for NaN, ±Inf and -0.0.
//!
//! ## Example
//!
//! ```
//! use tracedoc_wire::{to_json_string, Encodable, Row};
//!
//! let row = Row::new().with("id", 7i32).with("name", "probe");
//! let value = row.encode().unwrap();
//! assert_eq!(to_json_string(&value), r#"{"id":7,"name":"probe"}"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encode;
pub mod json;

pub use encode::{
    encode, encode_structural, Bytes, Encodable, Enumeration, LazySeq, Row, Structural,
};
pub use json::{
    from_json_str, from_json_value, to_json_pretty, to_json_string, to_json_value, DecodeError,
};

// Used by `impl_encodable_enum!` expansions
pub use tracedoc_core::{Error, Result, Value};
