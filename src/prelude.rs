//! Convenient imports for tracedoc.
//!
//! ```
//! use tracedoc::prelude::*;
//!
//! let db = TraceDb::ephemeral().unwrap();
//! let doc = Document::new(MasterKey::new(), RecordKey::new(), "run").unwrap();
//! db.upsert(&doc).unwrap();
//! ```

// Main entry point
pub use crate::config::Config;
pub use crate::database::{TraceDb, TraceDbBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{Document, Item, MasterKey, RecordKey, StorageId, StoredRecord, Value};

// Encoder
pub use crate::types::{Bytes, Encodable, Enumeration, LazySeq, Row, Structural};
pub use tracedoc_wire::impl_encodable_enum;
