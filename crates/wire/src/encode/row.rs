//! Row-like values: named columns encoded as a mapping

use std::collections::HashMap;
use std::fmt;

use tracedoc_core::{Error, Result, Value};

use super::Encodable;

type Column = Box<dyn Encodable + Send + Sync>;

/// A record of named columns, as returned by a tabular query
///
/// Encodes as a mapping from column name to encoded field value. Column
/// names must be unique; a duplicate is rejected when the row is encoded.
#[derive(Default)]
pub struct Row {
    columns: Vec<(String, Column)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column
    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Encodable + Send + Sync + 'static,
    {
        self.push(name, value);
        self
    }

    /// Append a column in place
    pub fn push<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Encodable + Send + Sync + 'static,
    {
        self.columns.push((name.into(), Box::new(value)));
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("columns", &self.column_names().collect::<Vec<_>>())
            .finish()
    }
}

impl Encodable for Row {
    fn encode(&self) -> Result<Value> {
        let mut object = HashMap::with_capacity(self.columns.len());
        for (name, value) in &self.columns {
            if object.contains_key(name) {
                return Err(Error::invalid_payload(
                    "Row",
                    format!("duplicate column name '{}'", name),
                ));
            }
            object.insert(name.clone(), value.encode()?);
        }
        Ok(Value::Object(object))
    }
}
