//! Main database entry point for tracedoc.
//!
//! [`TraceDb`] owns one collection, either in memory or persisted under a
//! data directory, and exposes the upsert protocol over it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracedoc_core::{MasterKey, Result as CoreResult, StorageId};
use tracedoc_engine::{Document, UpsertCoordinator};
use tracedoc_storage::{DocumentStore, FileStore, MemoryStore, StoredRecord, Transaction};
use tracing::info;

use crate::config::{Config, DEFAULT_COLLECTION};
use crate::error::Result;

/// Store behind a [`TraceDb`]
#[derive(Debug)]
enum Backend {
    Memory(MemoryStore),
    File(FileStore),
}

impl DocumentStore for Backend {
    fn transaction<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut dyn Transaction) -> CoreResult<T>,
    {
        match self {
            Backend::Memory(store) => store.transaction(f),
            Backend::File(store) => store.transaction(f),
        }
    }
}

/// The tracedoc database.
///
/// Create one with [`TraceDb::open`], [`TraceDb::ephemeral`] or
/// [`TraceDb::builder`]. It is `Send + Sync`; share it across threads
/// behind an `Arc`.
///
/// # Example
///
/// ```
/// use tracedoc::prelude::*;
///
/// let db = TraceDb::ephemeral().unwrap();
/// let key = MasterKey::new();
///
/// let doc = Document::new(key, RecordKey::new(), "test")
///     .unwrap()
///     .with_items([Item::text("bidule")]);
/// let record = db.upsert(&doc).unwrap();
///
/// let (stored, decoded) = db.get(key).unwrap().unwrap();
/// assert_eq!(stored.storage_id, record.storage_id);
/// assert_eq!(decoded.items().len(), 1);
/// ```
#[derive(Debug)]
pub struct TraceDb {
    coordinator: UpsertCoordinator<Backend>,
    collection: String,
    path: Option<PathBuf>,
}

impl TraceDb {
    /// Open the default collection under `path`, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory database that creates no files
    pub fn ephemeral() -> Result<Self> {
        Self::builder().ephemeral().open()
    }

    /// Open a database as described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder().config(config).open()
    }

    /// Create a builder for database configuration
    pub fn builder() -> TraceDbBuilder {
        TraceDbBuilder::new()
    }

    /// Insert `doc`, or append its items to the document sharing its
    /// master key
    pub fn upsert(&self, doc: &Document) -> Result<StoredRecord> {
        self.coordinator.upsert(doc).map_err(Into::into)
    }

    /// The stored record and decoded document for `master_key`
    pub fn get(&self, master_key: MasterKey) -> Result<Option<(StoredRecord, Document)>> {
        self.coordinator.get(master_key).map_err(Into::into)
    }

    /// The record with this storage id
    pub fn record(&self, storage_id: StorageId) -> Result<Option<StoredRecord>> {
        self.coordinator.record(storage_id).map_err(Into::into)
    }

    /// Every stored record, oldest first
    pub fn list(&self) -> Result<Vec<StoredRecord>> {
        self.coordinator.list().map_err(Into::into)
    }

    /// Every stored document, oldest first
    ///
    /// Fails on the first record that does not decode.
    pub fn documents(&self) -> Result<Vec<Document>> {
        self.list()?
            .iter()
            .map(|r| Document::decode_record(r.storage_id, &r.payload).map_err(Into::into))
            .collect()
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Data directory, `None` when ephemeral
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if this database keeps its data in memory only
    pub fn is_ephemeral(&self) -> bool {
        self.path.is_none()
    }

    /// Check if upserts on one master key are serialized
    pub fn is_serialized(&self) -> bool {
        self.coordinator.is_serialized()
    }
}

/// Builder for database configuration.
///
/// # Example
///
/// ```no_run
/// use tracedoc::TraceDb;
///
/// let db = TraceDb::builder()
///     .path("./traces")
///     .collection("nightly")
///     .serialize_upserts(true)
///     .open()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TraceDbBuilder {
    path: Option<PathBuf>,
    collection: String,
    serialize_upserts: bool,
}

impl Default for TraceDbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceDbBuilder {
    /// Start from the defaults: ephemeral, default collection, serialized
    pub fn new() -> Self {
        TraceDbBuilder {
            path: None,
            collection: DEFAULT_COLLECTION.to_string(),
            serialize_upserts: true,
        }
    }

    /// Take every setting from `config`
    pub fn config(mut self, config: &Config) -> Self {
        self.path = config.data_dir.clone();
        self.collection = config.collection.clone();
        self.serialize_upserts = config.serialize_upserts;
        self
    }

    /// Persist under this directory
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep data in memory only
    pub fn ephemeral(mut self) -> Self {
        self.path = None;
        self
    }

    /// Collection to open
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    /// Hold a per-master-key lock for each upsert
    pub fn serialize_upserts(mut self, on: bool) -> Self {
        self.serialize_upserts = on;
        self
    }

    /// Open the database
    pub fn open(self) -> Result<TraceDb> {
        let backend = match &self.path {
            Some(dir) => Backend::File(FileStore::open(dir, &self.collection)?),
            None => Backend::Memory(MemoryStore::new()),
        };
        let store = Arc::new(backend);
        let coordinator = if self.serialize_upserts {
            UpsertCoordinator::serialized(store)
        } else {
            UpsertCoordinator::new(store)
        };

        info!(
            collection = %self.collection,
            path = ?self.path,
            serialized = self.serialize_upserts,
            "database opened"
        );
        Ok(TraceDb {
            coordinator,
            collection: self.collection,
            path: self.path,
        })
    }
}
