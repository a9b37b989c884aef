//! Upsert coordinator
//!
//! The single write entry point of the engine. One upsert is one store
//! transaction:
//!
//! ```text
//! 1. find the record holding the candidate's master key
//! 2a. none: encode the candidate and insert it
//! 2b. found: merge stored + candidate, encode, replace in place
//! 3. commit (any error above rolls everything back)
//! ```
//!
//! ## Concurrent first writes
//!
//! Step 1 and step 2a are a check-then-act pair. Two upserts of a brand new
//! master key running at the same time can both see "none" and both
//! insert, leaving two records for one key. Later upserts then merge into
//! the oldest of them and log a warning. A coordinator built with
//! [`UpsertCoordinator::serialized`] holds a per-key lock across the whole
//! transaction, which rules this out for every writer sharing that
//! coordinator.

use std::sync::Arc;

use tracedoc_core::{MasterKey, Result, StorageId};
use tracedoc_storage::{DocumentStore, StoredRecord};
use tracing::{debug, info};

use crate::document::Document;
use crate::key_lock::KeyLocks;
use crate::matcher;
use crate::merge::merge;

/// Find-or-create/merge over a document store
///
/// Clones share both the store and, for serialized coordinators, the lock
/// set, so writers on different threads can each hold a clone.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tracedoc_core::{MasterKey, RecordKey};
/// use tracedoc_engine::{Document, Item, UpsertCoordinator};
/// use tracedoc_storage::MemoryStore;
///
/// let coordinator = UpsertCoordinator::new(Arc::new(MemoryStore::new()));
/// let key = MasterKey::new();
///
/// let first = Document::new(key, RecordKey::new(), "run").unwrap();
/// let created = coordinator.upsert(&first).unwrap();
///
/// let second = Document::new(key, RecordKey::new(), "run")
///     .unwrap()
///     .with_items([Item::text("bidule")]);
/// let merged = coordinator.upsert(&second).unwrap();
///
/// assert_eq!(merged.storage_id, created.storage_id);
/// ```
#[derive(Debug)]
pub struct UpsertCoordinator<S> {
    store: Arc<S>,
    locks: Option<Arc<KeyLocks>>,
}

impl<S> Clone for UpsertCoordinator<S> {
    fn clone(&self) -> Self {
        UpsertCoordinator {
            store: Arc::clone(&self.store),
            locks: self.locks.clone(),
        }
    }
}

impl<S: DocumentStore> UpsertCoordinator<S> {
    /// Coordinator without per-key serialization
    pub fn new(store: Arc<S>) -> Self {
        UpsertCoordinator { store, locks: None }
    }

    /// Coordinator that serializes upserts sharing a master key
    pub fn serialized(store: Arc<S>) -> Self {
        UpsertCoordinator {
            store,
            locks: Some(Arc::new(KeyLocks::new())),
        }
    }

    /// Whether upserts on one master key are serialized
    pub fn is_serialized(&self) -> bool {
        self.locks.is_some()
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Insert `candidate`, or merge it into the record holding its master key
    ///
    /// Returns the record as committed: a new storage id at version 1 on
    /// insert, the existing storage id at the next version on merge.
    ///
    /// # Errors
    ///
    /// Any encoder, schema or store error. Nothing is persisted when an
    /// error is returned.
    pub fn upsert(&self, candidate: &Document) -> Result<StoredRecord> {
        let master_key = candidate.master_key();
        let _guard = self.locks.as_ref().map(|locks| locks.lock(master_key));

        let (record, merged_into) = self.store.transaction(|txn| {
            match matcher::find(txn, master_key)? {
                None => {
                    let record = txn.insert(candidate.encode_for_storage()?)?;
                    Ok((record, None))
                }
                Some(found) => {
                    let merged = merge(&found.document, candidate);
                    let record =
                        txn.replace(found.record.storage_id, merged.encode_for_storage()?)?;
                    Ok((record, Some(merged.items().len())))
                }
            }
        })?;

        match merged_into {
            None => info!(
                %master_key,
                storage_id = %record.storage_id,
                items = candidate.items().len(),
                "created document"
            ),
            Some(total) => info!(
                %master_key,
                storage_id = %record.storage_id,
                appended = candidate.items().len(),
                items = total,
                version = record.version,
                "merged document"
            ),
        }
        Ok(record)
    }

    /// The stored record and decoded document for `master_key`
    pub fn get(&self, master_key: MasterKey) -> Result<Option<(StoredRecord, Document)>> {
        let found = self
            .store
            .transaction(|txn| matcher::find(txn, master_key))?;
        debug!(%master_key, found = found.is_some(), "get");
        Ok(found.map(|f| (f.record, f.document)))
    }

    /// The record with this storage id, as committed
    pub fn record(&self, storage_id: StorageId) -> Result<Option<StoredRecord>> {
        self.store.transaction(|txn| txn.get(storage_id))
    }

    /// Every stored record, oldest first
    pub fn list(&self) -> Result<Vec<StoredRecord>> {
        self.store.transaction(|txn| txn.scan())
    }
}
