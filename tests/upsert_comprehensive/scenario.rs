//! Scenario Tests
//!
//! The basic lifecycle of one master key, and items of every encodable
//! kind surviving storage.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracedoc::{
    impl_encodable_enum, Bytes, Enumeration, LazySeq, Row, Structural, Value,
};

use crate::*;

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn test_empty_then_bidule_then_x() {
    let db = create_db();
    let key = MasterKey::new();

    let created = db.upsert(&text_doc(key, &[])).unwrap();
    assert_eq!(created.version, 1);
    let (_, stored) = db.get(key).unwrap().unwrap();
    assert!(stored.items().is_empty());

    let second = db.upsert(&text_doc(key, &["bidule"])).unwrap();
    assert_eq!(second.storage_id, created.storage_id);
    let (_, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(texts(&stored), vec!["bidule"]);

    let third = db.upsert(&text_doc(key, &["x"])).unwrap();
    assert_eq!(third.storage_id, created.storage_id);
    assert_eq!(third.version, 3);
    let (_, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(texts(&stored), vec!["bidule", "x"]);

    assert_eq!(db.list().unwrap().len(), 1);
}

#[test]
fn test_merge_keeps_first_identity() {
    let db = create_db();
    let key = MasterKey::new();

    let first = Document::new(key, RecordKey::new(), "opening").unwrap();
    db.upsert(&first).unwrap();
    let later = Document::new(key, RecordKey::new(), "closing")
        .unwrap()
        .with_items([Item::text("done")]);
    db.upsert(&later).unwrap();

    let (_, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(stored.label(), "opening");
    assert_eq!(stored.record_key(), first.record_key());
    assert_eq!(texts(&stored), vec!["done"]);
}

#[test]
fn test_empty_upsert_on_existing_key_changes_nothing_but_version() {
    let db = create_db();
    let key = MasterKey::new();

    db.upsert(&text_doc(key, &["a", "b"])).unwrap();
    let record = db.upsert(&text_doc(key, &[])).unwrap();

    assert_eq!(record.version, 2);
    let (_, stored) = db.get(key).unwrap().unwrap();
    assert_eq!(texts(&stored), vec!["a", "b"]);
}

#[test]
fn test_keys_are_independent() {
    let db = create_db();
    let a = MasterKey::new();
    let b = MasterKey::new();

    db.upsert(&text_doc(a, &["a1"])).unwrap();
    db.upsert(&text_doc(b, &["b1"])).unwrap();
    db.upsert(&text_doc(a, &["a2"])).unwrap();

    assert_eq!(texts(&db.get(a).unwrap().unwrap().1), vec!["a1", "a2"]);
    assert_eq!(texts(&db.get(b).unwrap().unwrap().1), vec!["b1"]);

    let documents = db.documents().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].master_key(), a);
    assert_eq!(documents[1].master_key(), b);
}

#[test]
fn test_get_unknown_key_is_none() {
    let db = create_db();
    assert!(db.get(MasterKey::new()).unwrap().is_none());
}

// =============================================================================
// ITEM KINDS
// =============================================================================

enum Severity {
    Info,
    Alert,
}

impl Enumeration for Severity {
    type Repr = &'static str;

    fn value(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Alert => "alert",
        }
    }
}

impl_encodable_enum!(Severity);

#[derive(Serialize)]
struct Probe {
    name: String,
    depth: Option<u32>,
}

#[test]
fn test_items_of_every_kind_round_trip_through_storage() {
    let db = create_db();
    let key = MasterKey::new();

    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let amount = Decimal::from_str("12.50").unwrap();
    let tags: HashSet<String> = ["x".to_string()].into_iter().collect();
    let row = Row::new().with("at", at).with("amount", amount);
    let lazy = LazySeq::new([1i64, 2, 3].into_iter());
    let probe = Structural(Probe {
        name: "p".into(),
        depth: None,
    });

    let items = vec![
        Item::encode_from(&at).unwrap(),
        Item::encode_from(&day).unwrap(),
        Item::encode_from(&amount).unwrap(),
        Item::encode_from(&Bytes::from(&b"raw"[..])).unwrap(),
        Item::encode_from(&Severity::Alert).unwrap(),
        Item::encode_from(&Severity::Info).unwrap(),
        Item::encode_from(&tags).unwrap(),
        Item::encode_from(&row).unwrap(),
        Item::encode_from(&lazy).unwrap(),
        Item::encode_from(&probe).unwrap(),
    ];
    let doc = Document::new(key, RecordKey::new(), "kinds")
        .unwrap()
        .with_items(items);
    db.upsert(&doc).unwrap();

    let (_, stored) = db.get(key).unwrap().unwrap();
    let values: Vec<&Value> = stored.items().iter().map(Item::value).collect();
    assert_eq!(values[0], &Value::from("2024-03-09T14:05:00+00:00"));
    assert_eq!(values[1], &Value::from("2024-03-09"));
    assert_eq!(values[2], &Value::from("12.50"));
    assert_eq!(values[3], &Value::from("raw"));
    assert_eq!(values[4], &Value::from("alert"));
    assert_eq!(values[5], &Value::from("info"));
    assert_eq!(values[6], &Value::Array(vec![Value::from("x")]));
    assert_eq!(
        values[7],
        &Value::object([
            ("at", Value::from("2024-03-09T14:05:00+00:00")),
            ("amount", Value::from("12.50")),
        ])
    );
    assert_eq!(
        values[8],
        &Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(
        values[9],
        &Value::object([("name", Value::from("p")), ("depth", Value::Null)])
    );
}

#[test]
fn test_lazy_sequence_is_drained_once() {
    let lazy = LazySeq::new(vec!["a".to_string()].into_iter());
    assert!(Item::encode_from(&lazy).is_ok());
    assert!(lazy.is_consumed());
    assert!(Item::encode_from(&lazy).is_err());
}

// =============================================================================
// APPEND LAW
// =============================================================================

mod append_law {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn stored_items_are_the_concatenation_of_every_batch(
            batches in prop::collection::vec(
                prop::collection::vec("[a-z]{0,6}", 0..4),
                1..6,
            )
        ) {
            let db = create_db();
            let key = MasterKey::new();

            for batch in &batches {
                let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
                db.upsert(&text_doc(key, &refs)).unwrap();
            }

            let (record, stored) = db.get(key).unwrap().unwrap();
            let expected: Vec<String> = batches.concat();
            prop_assert_eq!(texts(&stored), expected);
            prop_assert_eq!(record.version as usize, batches.len());
            prop_assert_eq!(db.list().unwrap().len(), 1);
        }
    }
}
