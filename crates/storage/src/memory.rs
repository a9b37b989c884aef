//! In-memory transactional store
//!
//! ## Transaction model
//!
//! - Each transaction reads from the snapshot taken when it began, overlaid
//!   with its own buffered writes.
//! - Writes are buffered until the closure returns `Ok`.
//! - Commit is serialized by a commit lock. Under that lock every replaced
//!   record is validated first-committer-wins: if its version moved since
//!   the transaction read it, the commit aborts with `Conflict`.
//! - Inserts are not validated. Two transactions that both looked for a
//!   document and found none will both insert. Callers that need one
//!   record per key must serialize on that key themselves.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. acquire commit lock
//! 2. validate replaced versions against the current table
//! 3. build the next table (current + writes)
//! 4. hand it to the persist hook (no-op for MemoryStore)
//! 5. publish the next table
//! ```
//!
//! A failure at step 2 or 4 leaves the published table untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracedoc_core::{Error, Result, StorageId, Value};
use tracing::debug;

use crate::predicate::Predicate;
use crate::store::{DocumentStore, StoredRecord, Transaction};

// ============================================================================
// Committed state
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    sequence: u64,
    record: StoredRecord,
}

/// Committed records of one collection
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    entries: HashMap<StorageId, Entry>,
    next_sequence: u64,
}

impl Table {
    fn from_records(records: Vec<StoredRecord>) -> Self {
        let mut table = Table::default();
        for record in records {
            table.push(record);
        }
        table
    }

    fn push(&mut self, record: StoredRecord) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(record.storage_id, Entry { sequence, record });
    }

    /// Records in insertion order
    pub(crate) fn records(&self) -> Vec<StoredRecord> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.sequence);
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Ephemeral document store
///
/// Share it between threads with `Arc<MemoryStore>`.
///
/// # Example
///
/// ```
/// use tracedoc_core::Value;
/// use tracedoc_storage::{DocumentStore, MemoryStore, Predicate};
///
/// let store = MemoryStore::new();
/// let inserted = store
///     .transaction(|txn| txn.insert(Value::object([("k", Value::Int(1))])))
///     .unwrap();
/// let found = store
///     .transaction(|txn| txn.query(&Predicate::field("k", Value::Int(1))))
///     .unwrap();
/// assert_eq!(found, vec![inserted]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Arc<Table>>,
    /// Serializes validate → persist → publish
    commit_lock: Mutex<()>,
    next_txn_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`, in the given insertion order
    pub fn from_records(records: Vec<StoredRecord>) -> Self {
        MemoryStore {
            table: RwLock::new(Arc::new(Table::from_records(records))),
            ..Self::default()
        }
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Whether no record has been committed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed records in insertion order
    pub fn records(&self) -> Vec<StoredRecord> {
        self.table.read().records()
    }

    /// Replace the published table with `records`
    ///
    /// Callers must hold off every transaction on this store while
    /// reloading.
    pub(crate) fn reload(&self, records: Vec<StoredRecord>) {
        let _commit_guard = self.commit_lock.lock();
        *self.table.write() = Arc::new(Table::from_records(records));
    }

    /// Run a transaction, calling `persist` with the next table before it
    /// is published
    pub(crate) fn run<T, F, P>(&self, f: F, persist: P) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
        P: FnOnce(&Table) -> Result<()>,
    {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot: Arc<Table> = self.table.read().clone();
        let mut txn = MemoryTransaction::new(txn_id, snapshot);
        debug!(txn_id, "BEGIN");

        match f(&mut txn) {
            Ok(value) => {
                self.commit(txn, persist)?;
                Ok(value)
            }
            Err(e) => {
                debug!(txn_id, error = %e, "ROLLBACK");
                Err(e)
            }
        }
    }

    fn commit<P>(&self, txn: MemoryTransaction, persist: P) -> Result<()>
    where
        P: FnOnce(&Table) -> Result<()>,
    {
        let txn_id = txn.id;
        if txn.is_read_only() {
            debug!(txn_id, "COMMIT (read-only)");
            return Ok(());
        }

        let _commit_guard = self.commit_lock.lock();
        let current: Arc<Table> = self.table.read().clone();

        if let Err(e) = txn.validate(&current) {
            debug!(txn_id, error = %e, "ROLLBACK (validation)");
            return Err(e);
        }

        let mut next = (*current).clone();
        let (inserted, replaced) = txn.apply(&mut next);

        if let Err(e) = persist(&next) {
            debug!(txn_id, error = %e, "ROLLBACK (persist)");
            return Err(e);
        }

        *self.table.write() = Arc::new(next);
        debug!(txn_id, inserted, replaced, "COMMIT");
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
    {
        self.run(f, |_| Ok(()))
    }
}

// ============================================================================
// MemoryTransaction
// ============================================================================

#[derive(Debug)]
struct PendingReplace {
    /// Version the transaction saw before its first replace
    base_version: u64,
    record: StoredRecord,
}

/// Transaction handle over a [`MemoryStore`] snapshot
#[derive(Debug)]
struct MemoryTransaction {
    id: u64,
    snapshot: Arc<Table>,
    inserts: Vec<StoredRecord>,
    replaces: HashMap<StorageId, PendingReplace>,
}

impl MemoryTransaction {
    fn new(id: u64, snapshot: Arc<Table>) -> Self {
        MemoryTransaction {
            id,
            snapshot,
            inserts: Vec::new(),
            replaces: HashMap::new(),
        }
    }

    fn is_read_only(&self) -> bool {
        self.inserts.is_empty() && self.replaces.is_empty()
    }

    /// Snapshot records overlaid with this transaction's writes, in
    /// insertion order
    fn visible(&self) -> Vec<StoredRecord> {
        let mut records: Vec<StoredRecord> = self
            .snapshot
            .records()
            .into_iter()
            .map(|r| match self.replaces.get(&r.storage_id) {
                Some(pending) => pending.record.clone(),
                None => r,
            })
            .collect();
        records.extend(self.inserts.iter().cloned());
        records
    }

    fn lookup(&self, storage_id: StorageId) -> Option<StoredRecord> {
        if let Some(r) = self.inserts.iter().find(|r| r.storage_id == storage_id) {
            return Some(r.clone());
        }
        if let Some(pending) = self.replaces.get(&storage_id) {
            return Some(pending.record.clone());
        }
        self.snapshot
            .entries
            .get(&storage_id)
            .map(|e| e.record.clone())
    }

    fn validate(&self, current: &Table) -> Result<()> {
        for (storage_id, pending) in &self.replaces {
            match current.entries.get(storage_id) {
                Some(entry) if entry.record.version == pending.base_version => {}
                Some(entry) => {
                    return Err(Error::Conflict(format!(
                        "record {} changed from version {} to {} during transaction",
                        storage_id, pending.base_version, entry.record.version
                    )))
                }
                None => return Err(Error::RecordNotFound(*storage_id)),
            }
        }
        Ok(())
    }

    fn apply(self, table: &mut Table) -> (usize, usize) {
        let counts = (self.inserts.len(), self.replaces.len());
        for (storage_id, pending) in self.replaces {
            if let Some(entry) = table.entries.get_mut(&storage_id) {
                entry.record = pending.record;
            }
        }
        for record in self.inserts {
            table.push(record);
        }
        counts
    }
}

impl Transaction for MemoryTransaction {
    fn query(&mut self, predicate: &Predicate) -> Result<Vec<StoredRecord>> {
        let found: Vec<StoredRecord> = self
            .visible()
            .into_iter()
            .filter(|r| predicate.matches(&r.payload))
            .collect();
        debug!(txn_id = self.id, %predicate, rows = found.len(), "SELECT");
        Ok(found)
    }

    fn insert(&mut self, payload: Value) -> Result<StoredRecord> {
        let record = StoredRecord::inserted(payload);
        debug!(txn_id = self.id, storage_id = %record.storage_id, "INSERT");
        self.inserts.push(record.clone());
        Ok(record)
    }

    fn replace(&mut self, storage_id: StorageId, payload: Value) -> Result<StoredRecord> {
        if let Some(r) = self.inserts.iter_mut().find(|r| r.storage_id == storage_id) {
            *r = r.replaced_with(payload);
            debug!(txn_id = self.id, %storage_id, version = r.version, "UPDATE (pending insert)");
            return Ok(r.clone());
        }

        let updated = match self.replaces.get_mut(&storage_id) {
            Some(pending) => {
                pending.record = pending.record.replaced_with(payload);
                pending.record.clone()
            }
            None => {
                let base = self
                    .snapshot
                    .entries
                    .get(&storage_id)
                    .map(|e| e.record.clone())
                    .ok_or(Error::RecordNotFound(storage_id))?;
                let record = base.replaced_with(payload);
                self.replaces.insert(
                    storage_id,
                    PendingReplace {
                        base_version: base.version,
                        record: record.clone(),
                    },
                );
                record
            }
        };
        debug!(txn_id = self.id, %storage_id, version = updated.version, "UPDATE");
        Ok(updated)
    }

    fn get(&mut self, storage_id: StorageId) -> Result<Option<StoredRecord>> {
        let found = self.lookup(storage_id);
        debug!(txn_id = self.id, %storage_id, found = found.is_some(), "SELECT BY ID");
        Ok(found)
    }

    fn scan(&mut self) -> Result<Vec<StoredRecord>> {
        let records = self.visible();
        debug!(txn_id = self.id, rows = records.len(), "SELECT *");
        Ok(records)
    }
}
