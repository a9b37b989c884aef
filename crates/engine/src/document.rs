//! Document schema
//!
//! A [`Document`] is one trace update: a master key grouping every write of
//! a logical trace, a record key for this write, a short label and an
//! ordered list of [`Item`]s. Stores see it only in its canonical form:
//!
//! ```json
//! {
//!   "master_key": "dbd39cef-cf84-4ddb-bda4-3169e74f8774",
//!   "record_key": "8f7be1a2-0c4d-4e57-9b0e-41f0a9c2d6e3",
//!   "label": "test",
//!   "items": [{"text": "bidule"}]
//! }
//! ```

use tracedoc_core::{Error, MasterKey, RecordKey, Result, StorageId, Value};
use tracedoc_wire::Encodable;

/// Payload field names
pub mod fields {
    /// Master key field
    pub const MASTER_KEY: &str = "master_key";
    /// Record key field
    pub const RECORD_KEY: &str = "record_key";
    /// Label field
    pub const LABEL: &str = "label";
    /// Items field
    pub const ITEMS: &str = "items";
    /// Text field of a text item
    pub const TEXT: &str = "text";
}

// ============================================================================
// Item
// ============================================================================

/// A nested record owned by a [`Document`]
///
/// Holds an already-encoded sub-document. It has no identity beyond its
/// position in the document's item list.
#[derive(Debug, Clone, PartialEq)]
pub struct Item(Value);

impl Item {
    /// Wrap an encoded value
    pub fn new(value: Value) -> Self {
        Item(value)
    }

    /// An item with a single free-form text field: `{"text": "..."}`
    pub fn text(text: impl Into<String>) -> Self {
        Item(Value::object([(fields::TEXT, Value::String(text.into()))]))
    }

    /// Encode any value into an item
    ///
    /// Encoding happens here, so a value the encoder rejects never reaches
    /// a document.
    pub fn encode_from<T: Encodable + ?Sized>(value: &T) -> Result<Self> {
        value.encode().map(Item)
    }

    /// The item's value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// The `text` field, for text items
    pub fn as_text(&self) -> Option<&str> {
        self.0.get(fields::TEXT).and_then(Value::as_str)
    }

    /// Unwrap into the encoded value
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item(value)
    }
}

impl Encodable for Item {
    fn encode(&self) -> Result<Value> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// Document
// ============================================================================

/// In-memory representation of one trace update
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    master_key: MasterKey,
    record_key: RecordKey,
    label: String,
    items: Vec<Item>,
}

impl Document {
    /// Create a document with no items
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDocument`] if either identifier is the nil UUID or
    /// the label is blank.
    pub fn new(
        master_key: MasterKey,
        record_key: RecordKey,
        label: impl Into<String>,
    ) -> Result<Self> {
        if master_key.is_nil() {
            return Err(Error::InvalidDocument("master_key must not be nil".into()));
        }
        if record_key.is_nil() {
            return Err(Error::InvalidDocument("record_key must not be nil".into()));
        }
        let label = label.into();
        if label.trim().is_empty() {
            return Err(Error::InvalidDocument("label must not be empty".into()));
        }
        Ok(Document {
            master_key,
            record_key,
            label,
            items: Vec::new(),
        })
    }

    /// Replace the item list
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Append one item
    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Master key
    pub fn master_key(&self) -> MasterKey {
        self.master_key
    }

    /// Record key
    pub fn record_key(&self) -> RecordKey {
        self.record_key
    }

    /// Label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Items in insertion order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Canonical form persisted by stores
    pub fn encode_for_storage(&self) -> Result<Value> {
        Ok(Value::object([
            (fields::MASTER_KEY, self.master_key.encode()?),
            (fields::RECORD_KEY, self.record_key.encode()?),
            (fields::LABEL, self.label.encode()?),
            (fields::ITEMS, self.items.encode()?),
        ]))
    }

    /// Rebuild a document from its stored form
    ///
    /// `items` may be absent and then decodes to an empty list. Anything
    /// else that does not fit the schema fails with
    /// [`Error::MalformedStoredPayload`].
    pub fn decode_from_storage(raw: &Value) -> Result<Document> {
        let object = raw
            .as_object()
            .ok_or_else(|| malformed(format!("expected an object, got {}", raw.type_name())))?;

        let master_key = MasterKey::parse(required_str(raw, fields::MASTER_KEY)?)
            .map_err(|e| malformed(e.to_string()))?;
        let record_key = RecordKey::parse(required_str(raw, fields::RECORD_KEY)?)
            .map_err(|e| malformed(e.to_string()))?;

        let label = required_str(raw, fields::LABEL)?;
        if label.trim().is_empty() {
            return Err(malformed("label is empty"));
        }

        let items = match object.get(fields::ITEMS) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().cloned().map(Item).collect(),
            Some(other) => {
                return Err(malformed(format!(
                    "items must be an array, got {}",
                    other.type_name()
                )))
            }
        };

        Ok(Document {
            master_key,
            record_key,
            label: label.to_string(),
            items,
        })
    }

    /// Decode a stored payload, naming the record on failure
    pub fn decode_record(storage_id: StorageId, raw: &Value) -> Result<Document> {
        Self::decode_from_storage(raw).map_err(|e| e.with_storage_id(storage_id))
    }
}

impl Encodable for Document {
    fn encode(&self) -> Result<Value> {
        self.encode_for_storage()
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::malformed(None, reason)
}

fn required_str<'a>(raw: &'a Value, field: &str) -> Result<&'a str> {
    match raw.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(format!(
            "{} must be a string, got {}",
            field,
            other.type_name()
        ))),
        None => Err(malformed(format!("missing field {}", field))),
    }
}
