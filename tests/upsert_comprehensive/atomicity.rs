//! Atomicity Tests
//!
//! An upsert either commits completely or leaves the store as it was.

use std::sync::Arc;

use tracedoc::{
    DocumentStore, MemoryStore, Predicate, Row, StorageId, StoredRecord, Structural, Transaction,
    UpsertCoordinator, Value,
};
use tracedoc_core::{Error as CoreError, Result as CoreResult};

use crate::*;

// =============================================================================
// A STORE THAT LOSES ITS CONNECTION AT COMMIT
// =============================================================================

/// Runs every transaction body, then fails instead of committing
struct DropsCommit(MemoryStore);

impl DocumentStore for DropsCommit {
    fn transaction<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut dyn Transaction) -> CoreResult<T>,
    {
        self.0.transaction(|txn| {
            f(txn)?;
            Err(CoreError::StoreUnavailable("connection lost at commit".into()))
        })
    }
}

/// Fails every replace, passes everything else through
struct RejectsReplace(MemoryStore);

struct RejectsReplaceTxn<'a>(&'a mut dyn Transaction);

impl Transaction for RejectsReplaceTxn<'_> {
    fn query(&mut self, predicate: &Predicate) -> CoreResult<Vec<StoredRecord>> {
        self.0.query(predicate)
    }

    fn insert(&mut self, payload: Value) -> CoreResult<StoredRecord> {
        self.0.insert(payload)
    }

    fn replace(&mut self, storage_id: StorageId, _: Value) -> CoreResult<StoredRecord> {
        Err(CoreError::Storage(format!("replace of {} refused", storage_id)))
    }

    fn get(&mut self, storage_id: StorageId) -> CoreResult<Option<StoredRecord>> {
        self.0.get(storage_id)
    }

    fn scan(&mut self) -> CoreResult<Vec<StoredRecord>> {
        self.0.scan()
    }
}

impl DocumentStore for RejectsReplace {
    fn transaction<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut dyn Transaction) -> CoreResult<T>,
    {
        self.0.transaction(|txn| f(&mut RejectsReplaceTxn(txn)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_commit_failure_on_insert_persists_nothing() {
    let store = Arc::new(DropsCommit(MemoryStore::new()));
    let coordinator = UpsertCoordinator::new(Arc::clone(&store));

    let err = coordinator
        .upsert(&text_doc(MasterKey::new(), &["x"]))
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(store.0.is_empty());
}

#[test]
fn test_commit_failure_on_merge_keeps_previous_state() {
    let seeded = UpsertCoordinator::new(Arc::new(MemoryStore::new()));
    let key = MasterKey::new();
    let created = seeded.upsert(&text_doc(key, &["kept"])).unwrap();

    let store = Arc::new(DropsCommit(MemoryStore::from_records(
        seeded.store().records(),
    )));
    let coordinator = UpsertCoordinator::new(Arc::clone(&store));
    assert!(coordinator.upsert(&text_doc(key, &["lost"])).is_err());

    assert_eq!(store.0.records(), vec![created]);
}

#[test]
fn test_failed_replace_is_surfaced_and_rolled_back() {
    let store = Arc::new(RejectsReplace(MemoryStore::new()));
    let coordinator = UpsertCoordinator::new(Arc::clone(&store));
    let key = MasterKey::new();

    let created = coordinator.upsert(&text_doc(key, &["a"])).unwrap();
    let err = coordinator.upsert(&text_doc(key, &["b"])).unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));

    let records = store.0.records();
    assert_eq!(records, vec![created]);
}

#[test]
fn test_unencodable_item_never_reaches_the_store() {
    let db = create_db();
    let key = MasterKey::new();
    db.upsert(&text_doc(key, &["before"])).unwrap();

    let build = || -> CoreResult<Document> {
        let items = vec![Item::text("fine"), Item::encode_from(&u64::MAX)?];
        Ok(Document::new(key, RecordKey::new(), "test")?.with_items(items))
    };
    let err = build().unwrap_err();
    assert!(err.is_encoding());

    let (record, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(texts(&stored), vec!["before"]);
}

#[test]
fn test_encoding_failures_are_classified() {
    assert!(matches!(
        Item::encode_from(&Structural(())),
        Err(CoreError::UnencodableType { .. })
    ));

    let duplicate = Row::new().with("a", 1i32).with("a", 2i32);
    assert!(matches!(
        Item::encode_from(&duplicate),
        Err(CoreError::InvalidPayload { .. })
    ));
}

#[test]
fn test_invalid_document_is_rejected_before_the_store() {
    let nil = MasterKey::from_bytes([0; 16]);
    assert!(matches!(
        Document::new(nil, RecordKey::new(), "test"),
        Err(CoreError::InvalidDocument(_))
    ));
    assert!(Document::new(MasterKey::new(), RecordKey::new(), "").is_err());
}
