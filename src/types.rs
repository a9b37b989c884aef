//! Public types for the tracedoc API.
//!
//! Re-exports types from the internal crates with a clean public interface.

// Identifiers and the canonical value tree
pub use tracedoc_core::{MasterKey, RecordKey, StorageId, Value};

// Document schema
pub use tracedoc_engine::{fields, Document, Item};

// Stored envelope and lookup
pub use tracedoc_storage::{Predicate, StoredRecord};

// Encoder
pub use tracedoc_wire::{
    encode, encode_structural, Bytes, Encodable, Enumeration, LazySeq, Row, Structural,
};
