//! # tracedoc
//!
//! Append-merge store for tracing documents.
//!
//! Every document carries a master key. Upserting a document whose master
//! key is new stores it; upserting one whose master key is already stored
//! appends its items to the stored document in place, keeping the storage
//! id.
//!
//! ## Quick Start
//!
//! ```
//! use tracedoc::prelude::*;
//!
//! let db = TraceDb::ephemeral().unwrap();
//! let key = MasterKey::new();
//!
//! let first = Document::new(key, RecordKey::new(), "test").unwrap();
//! let created = db.upsert(&first).unwrap();
//!
//! let second = Document::new(key, RecordKey::new(), "test")
//!     .unwrap()
//!     .with_items([Item::text("bidule")]);
//! let merged = db.upsert(&second).unwrap();
//!
//! assert_eq!(created.storage_id, merged.storage_id);
//! assert_eq!(merged.version, 2);
//! ```
//!
//! ## Crates
//!
//! - `tracedoc-core`: value tree, identifiers, error taxonomy
//! - `tracedoc-wire`: canonical encoder and JSON text form
//! - `tracedoc-storage`: store capability, in-memory and file stores
//! - `tracedoc-engine`: document schema and the upsert protocol

#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use config::{Config, DEFAULT_COLLECTION};
pub use database::{TraceDb, TraceDbBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;

// Lower layers, for custom stores and direct encoder use
pub use tracedoc_engine::{KeyLocks, UpsertCoordinator};
pub use tracedoc_storage::{contains, DocumentStore, FileStore, MemoryStore, Transaction};
pub use tracedoc_wire::{impl_encodable_enum, json};
