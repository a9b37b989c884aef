//! Merge engine
//!
//! One policy: the incoming document's items are appended after the
//! existing ones. Identity fields stay those of the existing document, so
//! a merged record keeps the record key and label it was created with.

use crate::document::Document;

/// Combine a stored document with an incoming one
///
/// Pure: neither input is modified. Items are neither reordered nor
/// deduplicated.
pub(crate) fn merge(existing: &Document, incoming: &Document) -> Document {
    let mut merged = existing.clone();
    for item in incoming.items() {
        merged.push_item(item.clone());
    }
    merged
}
