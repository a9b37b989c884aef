//! Match finder
//!
//! Looks up the stored record for a master key through the store's
//! containment query, then proves each candidate by decoding its master
//! key and comparing for equality. Containment only narrows the search:
//! a store whose containment is looser than JSONB's (say, substring
//! matching on strings) still never yields a false match here.

use tracedoc_core::{MasterKey, Result, Value};
use tracedoc_storage::{Predicate, StoredRecord, Transaction};
use tracedoc_wire::Encodable;
use tracing::{debug, warn};

use crate::document::{fields, Document};

/// A stored record proven to hold a given master key
#[derive(Debug, Clone)]
pub(crate) struct Found {
    pub(crate) record: StoredRecord,
    pub(crate) document: Document,
}

/// Find the live record for `master_key` inside `txn`
///
/// When several records hold the key, the oldest one wins and a warning is
/// logged; see [`UpsertCoordinator`](crate::UpsertCoordinator) for how that
/// state arises.
pub(crate) fn find(txn: &mut dyn Transaction, master_key: MasterKey) -> Result<Option<Found>> {
    let predicate = Predicate::field(fields::MASTER_KEY, master_key.encode()?);
    let candidates = txn.query(&predicate)?;
    let total = candidates.len();

    let mut exact = Vec::new();
    for record in candidates {
        if !holds_key(&record.payload, master_key) {
            debug!(storage_id = %record.storage_id, %master_key, "discarding inexact candidate");
            continue;
        }
        let document = Document::decode_record(record.storage_id, &record.payload)?;
        exact.push(Found { record, document });
    }

    if exact.len() > 1 {
        warn!(
            %master_key,
            matches = exact.len(),
            kept = %exact[0].record.storage_id,
            "several stored records share one master key; merging into the oldest"
        );
    }
    debug!(%master_key, candidates = total, exact = exact.len(), "match lookup");
    Ok(exact.into_iter().next())
}

fn holds_key(payload: &Value, master_key: MasterKey) -> bool {
    payload
        .get(fields::MASTER_KEY)
        .and_then(Value::as_str)
        .and_then(|s| MasterKey::parse(s).ok())
        .map_or(false, |k| k == master_key)
}
