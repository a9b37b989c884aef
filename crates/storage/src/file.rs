//! File-backed document store
//!
//! A [`MemoryStore`] whose committed state is mirrored to
//! `<dir>/<collection>.json`. The file is rewritten after every write
//! transaction, before the new state becomes visible, by writing a
//! temporary sibling and renaming it over the old file. A crash therefore
//! leaves either the old snapshot or the new one, never a torn file.
//!
//! ## Snapshot layout
//!
//! ```json
//! {
//!   "collection": "traces",
//!   "format": 1,
//!   "records": [
//!     {"storage_id": "…", "version": 2, "payload": {…}}
//!   ]
//! }
//! ```
//!
//! Records appear in insertion order, so reopening preserves it.
//!
//! ## Sharing a collection
//!
//! Several handles (in one process or many) may open the same collection.
//! Every transaction holds an exclusive advisory lock on
//! `<dir>/<collection>.lock` and reloads the snapshot under it, so each
//! transaction starts from the latest committed state on disk and no
//! commit overwrites another handle's records.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use advisory_lock::{AdvisoryFileLock, FileLockError, FileLockMode};
use parking_lot::Mutex;
use tracedoc_core::{Error, Result, StorageId, Value};
use tracedoc_wire::{from_json_str, to_json_string};
use tracing::{debug, info, warn};

use crate::memory::MemoryStore;
use crate::store::{DocumentStore, StoredRecord, Transaction};

const SNAPSHOT_FORMAT: i64 = 1;

/// Durable document store persisted as a JSON snapshot
#[derive(Debug)]
pub struct FileStore {
    inner: MemoryStore,
    collection: String,
    path: PathBuf,
    lock_path: PathBuf,
    /// Lock file handle; the mutex orders transactions of this handle
    lock_file: Mutex<File>,
}

impl FileStore {
    /// Open (or create) `collection` under `dir`
    ///
    /// Creates `dir` if needed and loads the existing snapshot, if any.
    /// A snapshot that cannot be parsed fails the open instead of being
    /// discarded.
    pub fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self> {
        validate_collection(collection)?;
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let path = dir.join(format!("{}.json", collection));
        let lock_path = dir.join(format!("{}.lock", collection));
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;

        let store = FileStore {
            inner: MemoryStore::new(),
            collection: collection.to_string(),
            path,
            lock_path,
            lock_file: Mutex::new(lock_file),
        };
        store.with_lock(|| Ok(()))?;

        info!(path = %store.path.display(), records = store.len(), "opened collection");
        Ok(store)
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records as of this handle's last transaction
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no record was committed as of this handle's last transaction
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Records in insertion order as of this handle's last transaction
    pub fn records(&self) -> Vec<StoredRecord> {
        self.inner.records()
    }

    /// Run `body` holding the collection lock, after reloading the snapshot
    fn with_lock<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_file = self.lock_file.lock();
        AdvisoryFileLock::lock(&*lock_file, FileLockMode::Exclusive)
            .map_err(|e| lock_error(&self.lock_path, e))?;

        let result = self.read_snapshot().and_then(|records| {
            self.inner.reload(records);
            body()
        });

        if let Err(e) = AdvisoryFileLock::unlock(&*lock_file) {
            warn!(
                path = %self.lock_path.display(),
                error = %lock_error(&self.lock_path, e),
                "failed to release collection lock"
            );
        }
        result
    }

    fn read_snapshot(&self) -> Result<Vec<StoredRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        let records = decode_snapshot(&text, &self.collection)?;
        debug!(path = %self.path.display(), records = records.len(), "snapshot loaded");
        Ok(records)
    }

    fn write_snapshot(&self, records: &[StoredRecord]) -> Result<()> {
        let text = to_json_string(&encode_snapshot(&self.collection, records));
        let tmp = self.path.with_extension("json.tmp");

        let mut file = File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;

        debug!(path = %self.path.display(), records = records.len(), "snapshot written");
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
    {
        self.with_lock(|| {
            self.inner
                .run(f, |table| self.write_snapshot(&table.records()))
        })
    }
}

fn validate_collection(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!(
            "invalid collection name '{}': use ASCII letters, digits, '_' or '-'",
            name
        )))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
    Error::Storage(format!("{}: {}", path.display(), e))
}

fn lock_error(path: &Path, e: FileLockError) -> Error {
    match e {
        FileLockError::AlreadyLocked => {
            Error::Storage(format!("{}: collection is locked", path.display()))
        }
        FileLockError::Io(e) => io_error(path, e),
    }
}

// ============================================================================
// Snapshot encoding
// ============================================================================

fn encode_snapshot(collection: &str, records: &[StoredRecord]) -> Value {
    let records = records
        .iter()
        .map(|r| {
            Value::object([
                ("storage_id", Value::String(r.storage_id.to_string())),
                ("version", Value::Int(r.version as i64)),
                ("payload", r.payload.clone()),
            ])
        })
        .collect();
    Value::object([
        ("collection", Value::from(collection)),
        ("format", Value::Int(SNAPSHOT_FORMAT)),
        ("records", Value::Array(records)),
    ])
}

fn decode_snapshot(text: &str, collection: &str) -> Result<Vec<StoredRecord>> {
    let root = from_json_str(text)?;

    match root.get("format").and_then(Value::as_int) {
        Some(SNAPSHOT_FORMAT) => {}
        other => {
            return Err(Error::Storage(format!(
                "unsupported snapshot format {:?} for collection '{}'",
                other, collection
            )))
        }
    }
    if root.get("collection").and_then(Value::as_str) != Some(collection) {
        return Err(Error::Storage(format!(
            "snapshot does not belong to collection '{}'",
            collection
        )));
    }

    root.get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed(None, "snapshot has no records array"))?
        .iter()
        .map(decode_record)
        .collect()
}

fn decode_record(raw: &Value) -> Result<StoredRecord> {
    let storage_id = raw
        .get("storage_id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed(None, "record has no storage_id"))
        .and_then(|s| {
            StorageId::parse(s).map_err(|e| Error::malformed(None, e.to_string()))
        })?;

    let version = raw
        .get("version")
        .and_then(Value::as_int)
        .filter(|v| *v >= 1)
        .ok_or_else(|| Error::malformed(Some(storage_id), "missing or invalid version"))?;

    let payload = raw
        .get("payload")
        .cloned()
        .ok_or_else(|| Error::malformed(Some(storage_id), "record has no payload"))?;

    Ok(StoredRecord {
        storage_id,
        payload,
        version: version as u64,
    })
}
