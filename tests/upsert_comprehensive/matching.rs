//! Matching Tests
//!
//! The coordinator must only ever merge into a record whose master key is
//! exactly the candidate's, whatever the store's notion of containment.

use std::sync::Arc;

use parking_lot::Mutex;
use tracedoc::{
    DocumentStore, Predicate, StorageId, StoredRecord, Transaction, UpsertCoordinator, Value,
};
use tracedoc_core::{Error as CoreError, Result as CoreResult};

use crate::*;

// =============================================================================
// A STORE WITH LOOSE CONTAINMENT
// =============================================================================

/// Store whose containment treats strings as substring matches
///
/// A queried string matches any stored string containing its first
/// hyphen-separated group, so UUIDs sharing a prefix all come back.
#[derive(Default)]
struct LooseStore {
    records: Mutex<Vec<StoredRecord>>,
}

fn loosely_contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::Object(hay), Value::Object(need)) => need
            .iter()
            .all(|(k, n)| hay.get(k).map_or(false, |h| loosely_contains(h, n))),
        (Value::String(h), Value::String(n)) => {
            let n = n.split('-').next().unwrap_or_default();
            h.contains(n)
        }
        (h, n) => h == n,
    }
}

struct LooseTxn {
    records: Vec<StoredRecord>,
}

impl Transaction for LooseTxn {
    fn query(&mut self, predicate: &Predicate) -> CoreResult<Vec<StoredRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| match predicate {
                Predicate::All => true,
                Predicate::Contains(needle) => loosely_contains(&r.payload, needle),
            })
            .cloned()
            .collect())
    }

    fn insert(&mut self, payload: Value) -> CoreResult<StoredRecord> {
        let record = StoredRecord::inserted(payload);
        self.records.push(record.clone());
        Ok(record)
    }

    fn replace(&mut self, storage_id: StorageId, payload: Value) -> CoreResult<StoredRecord> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.storage_id == storage_id)
            .ok_or(CoreError::RecordNotFound(storage_id))?;
        *slot = slot.replaced_with(payload);
        Ok(slot.clone())
    }

    fn get(&mut self, storage_id: StorageId) -> CoreResult<Option<StoredRecord>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.storage_id == storage_id)
            .cloned())
    }

    fn scan(&mut self) -> CoreResult<Vec<StoredRecord>> {
        Ok(self.records.clone())
    }
}

impl DocumentStore for LooseStore {
    fn transaction<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut dyn Transaction) -> CoreResult<T>,
    {
        let mut records = self.records.lock();
        let mut txn = LooseTxn {
            records: records.clone(),
        };
        let out = f(&mut txn)?;
        *records = txn.records;
        Ok(out)
    }
}

fn key(text: &str) -> MasterKey {
    MasterKey::parse(text).unwrap()
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_shared_prefix_is_not_a_match() {
    let store = Arc::new(LooseStore::default());
    let coordinator = UpsertCoordinator::new(Arc::clone(&store));

    let first = key("dbd39cef-cf84-4ddb-bda4-3169e74f8774");
    let second = key("dbd39cef-0000-4000-8000-000000000001");

    coordinator.upsert(&text_doc(first, &["one"])).unwrap();
    coordinator.upsert(&text_doc(second, &["two"])).unwrap();

    assert_eq!(store.records.lock().len(), 2);
    let (_, a) = coordinator.get(first).unwrap().unwrap();
    let (_, b) = coordinator.get(second).unwrap().unwrap();
    assert_eq!(texts(&a), vec!["one"]);
    assert_eq!(texts(&b), vec!["two"]);
}

#[test]
fn test_key_mentioned_in_items_is_not_a_match() {
    let db = create_db();
    let target = MasterKey::new();
    let other = MasterKey::new();

    let mention = target.to_string();
    db.upsert(&text_doc(other, &[mention.as_str()])).unwrap();
    let record = db.upsert(&text_doc(target, &["own"])).unwrap();

    assert_eq!(record.version, 1);
    assert_eq!(db.list().unwrap().len(), 2);
    assert_eq!(texts(&db.get(other).unwrap().unwrap().1), vec![target.to_string()]);
}

#[test]
fn test_malformed_exact_match_is_reported() {
    let store = Arc::new(LooseStore::default());
    let k = MasterKey::new();
    let broken = StoredRecord::inserted(Value::object([
        ("master_key", Value::from(k.to_string())),
        ("label", Value::from("missing record key")),
    ]));
    let broken_id = broken.storage_id;
    store.records.lock().push(broken);

    let coordinator = UpsertCoordinator::new(Arc::clone(&store));
    let err = coordinator.upsert(&text_doc(k, &["x"])).unwrap_err();
    match err {
        CoreError::MalformedStoredPayload { storage_id, .. } => {
            assert_eq!(storage_id, Some(broken_id))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(store.records.lock().len(), 1);
}
