//! Upsert Comprehensive Test Suite
//!
//! End-to-end checks of the find-or-create/merge protocol through the
//! public `tracedoc` API.
//!
//! ## Key Verification Points
//!
//! 1. A master key maps to exactly one stored record
//! 2. Merges append items and keep the storage id
//! 3. Matching is exact even over loose containment
//! 4. Failed upserts persist nothing
//! 5. Serialized upserts never duplicate a key
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test upsert_comprehensive
//! cargo test --test upsert_comprehensive concurrency::
//! ```

use tracedoc::{Document, Item, MasterKey, RecordKey, TraceDb};

pub mod atomicity;
pub mod concurrency;
pub mod durability;
pub mod matching;
pub mod scenario;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Create an in-memory database
pub fn create_db() -> TraceDb {
    TraceDb::ephemeral().expect("Failed to create ephemeral database")
}

/// Document labelled "test" holding one text item per entry
pub fn text_doc(master_key: MasterKey, texts: &[&str]) -> Document {
    Document::new(master_key, RecordKey::new(), "test")
        .expect("valid document")
        .with_items(texts.iter().map(|t| Item::text(*t)))
}

/// The text items of a document, in order
pub fn texts(doc: &Document) -> Vec<String> {
    doc.items()
        .iter()
        .filter_map(Item::as_text)
        .map(str::to_string)
        .collect()
}
