//! Durability Tests
//!
//! File-backed databases survive being closed and reopened.

use tempfile::TempDir;
use tracedoc::{Config, FileStore};

use crate::*;

#[test]
fn test_reopen_sees_merged_document() {
    let dir = TempDir::new().unwrap();
    let key = MasterKey::new();

    let created = {
        let db = TraceDb::open(dir.path()).unwrap();
        let created = db.upsert(&text_doc(key, &["bidule"])).unwrap();
        db.upsert(&text_doc(key, &["x"])).unwrap();
        created
    };

    let db = TraceDb::open(dir.path()).unwrap();
    let (record, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(record.storage_id, created.storage_id);
    assert_eq!(record.version, 2);
    assert_eq!(texts(&stored), vec!["bidule", "x"]);
}

#[test]
fn test_merge_after_reopen_keeps_storage_id() {
    let dir = TempDir::new().unwrap();
    let key = MasterKey::new();

    let created = TraceDb::open(dir.path())
        .unwrap()
        .upsert(&text_doc(key, &["a"]))
        .unwrap();
    let merged = TraceDb::open(dir.path())
        .unwrap()
        .upsert(&text_doc(key, &["b"]))
        .unwrap();

    assert_eq!(merged.storage_id, created.storage_id);
    assert_eq!(merged.version, 2);
}

#[test]
fn test_collections_are_separate_files() {
    let dir = TempDir::new().unwrap();
    let key = MasterKey::new();

    let runs = TraceDb::builder()
        .path(dir.path())
        .collection("runs")
        .open()
        .unwrap();
    runs.upsert(&text_doc(key, &["r"])).unwrap();

    let audits = TraceDb::builder()
        .path(dir.path())
        .collection("audits")
        .open()
        .unwrap();
    assert!(audits.get(key).unwrap().is_none());

    assert!(dir.path().join("runs.json").exists());
    let store = FileStore::open(dir.path(), "runs").unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn test_config_file_drives_the_database() {
    let dir = TempDir::new().unwrap();
    let config = Config::from_toml_str(&format!(
        "data_dir = {:?}\ncollection = \"from_config\"\nserialize_upserts = false\n",
        dir.path().display().to_string()
    ))
    .unwrap();

    let db = TraceDb::from_config(&config).unwrap();
    assert!(!db.is_serialized());
    assert_eq!(db.collection(), "from_config");
    db.upsert(&text_doc(MasterKey::new(), &[])).unwrap();

    assert!(dir.path().join("from_config.json").exists());
}

#[test]
fn test_ephemeral_database_writes_nothing() {
    let db = create_db();
    assert!(db.is_ephemeral());
    assert!(db.path().is_none());
    db.upsert(&text_doc(MasterKey::new(), &["x"])).unwrap();
}

#[test]
fn test_two_handles_on_one_directory_merge_into_the_same_record() {
    let dir = TempDir::new().unwrap();
    let k1 = MasterKey::new();
    let k2 = MasterKey::new();

    let a = TraceDb::open(dir.path()).unwrap();
    let b = TraceDb::open(dir.path()).unwrap();

    let created = a.upsert(&text_doc(k1, &["from-a"])).unwrap();
    b.upsert(&text_doc(k2, &["from-b"])).unwrap();
    let merged = b.upsert(&text_doc(k1, &["b-on-k1"])).unwrap();

    assert_eq!(merged.storage_id, created.storage_id);
    assert_eq!(merged.version, 2);
    assert_eq!(a.list().unwrap().len(), 2);

    let reopened = TraceDb::open(dir.path()).unwrap();
    assert_eq!(reopened.list().unwrap().len(), 2);
    assert_eq!(
        texts(&reopened.get(k1).unwrap().unwrap().1),
        vec!["from-a", "b-on-k1"]
    );
    assert_eq!(texts(&reopened.get(k2).unwrap().unwrap().1), vec!["from-b"]);
}
