//! Store capability
//!
//! The engine never talks to a concrete backend. It opens a transaction
//! through [`DocumentStore::transaction`] and works against the
//! [`Transaction`] handle it is given. Everything done through that handle
//! commits together when the closure returns `Ok`, and is discarded when it
//! returns `Err`.

use tracedoc_core::{Result, StorageId, Value};

/// A persisted document envelope
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Assigned on insert, stable across replaces
    pub storage_id: StorageId,
    /// Canonical-encoded document
    pub payload: Value,
    /// 1 on insert, incremented by every replace
    pub version: u64,
}

impl StoredRecord {
    /// A freshly inserted record
    pub fn inserted(payload: Value) -> Self {
        StoredRecord {
            storage_id: StorageId::new(),
            payload,
            version: 1,
        }
    }

    /// The record that replaces this one
    pub fn replaced_with(&self, payload: Value) -> Self {
        StoredRecord {
            storage_id: self.storage_id,
            payload,
            version: self.version + 1,
        }
    }
}

/// Operations available inside one store transaction
///
/// Reads see the transaction's own uncommitted writes. `query` and `scan`
/// return records in insertion order, oldest first.
pub trait Transaction {
    /// Records whose payload satisfies `predicate`
    fn query(&mut self, predicate: &crate::Predicate) -> Result<Vec<StoredRecord>>;

    /// Insert a new record under a fresh storage id
    fn insert(&mut self, payload: Value) -> Result<StoredRecord>;

    /// Replace the payload of an existing record in place
    ///
    /// Fails with [`RecordNotFound`](tracedoc_core::Error::RecordNotFound)
    /// when no record has this id.
    fn replace(&mut self, storage_id: StorageId, payload: Value) -> Result<StoredRecord>;

    /// Fetch one record by storage id
    fn get(&mut self, storage_id: StorageId) -> Result<Option<StoredRecord>>;

    /// Every record in the collection
    fn scan(&mut self) -> Result<Vec<StoredRecord>>;
}

/// A collection of stored records supporting all-or-nothing transactions
pub trait DocumentStore: Send + Sync {
    /// Run `f` inside one transaction
    ///
    /// Commits when `f` returns `Ok` and rolls back when it returns `Err`.
    /// Commit itself may fail, e.g. with
    /// [`Conflict`](tracedoc_core::Error::Conflict) when a record replaced
    /// by `f` was changed by a concurrent transaction.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>;
}

impl<S: DocumentStore> DocumentStore for std::sync::Arc<S> {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
    {
        (**self).transaction(f)
    }
}
