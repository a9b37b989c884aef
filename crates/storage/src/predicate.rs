//! Structural containment
//!
//! [`contains`] follows the semantics of PostgreSQL's `jsonb @>`:
//!
//! | Needle | Haystack contains it when |
//! |--------|---------------------------|
//! | object | every needle key is present with a containing value |
//! | array  | every needle element is contained by some haystack element |
//! | scalar | the haystack is an equal scalar |
//!
//! Containment is a lookup aid. A match says "worth a closer look", not
//! "equal"; callers that need equality on a field must check it.

use std::fmt;

use tracedoc_core::Value;
use tracedoc_wire::to_json_string;

/// Filter applied by [`Transaction::query`](crate::Transaction::query)
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    All,
    /// Matches records whose payload contains this fragment
    Contains(Value),
}

impl Predicate {
    /// Records whose payload has `field` containing `value`
    pub fn field(field: impl Into<String>, value: Value) -> Self {
        Predicate::Contains(Value::object([(field.into(), value)]))
    }

    /// Whether `payload` satisfies this predicate
    pub fn matches(&self, payload: &Value) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Contains(needle) => contains(payload, needle),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "TRUE"),
            Predicate::Contains(needle) => write!(f, "payload @> '{}'", to_json_string(needle)),
        }
    }
}

/// Whether `haystack` structurally contains `needle`
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::Object(hay), Value::Object(need)) => need
            .iter()
            .all(|(k, n)| hay.get(k).map_or(false, |h| contains(h, n))),
        (Value::Array(hay), Value::Array(need)) => {
            need.iter().all(|n| hay.iter().any(|h| contains(h, n)))
        }
        (Value::Object(_), _) | (Value::Array(_), _) => false,
        (h, n) => h == n,
    }
}
