//! Upsert engine for tracedoc
//!
//! - [`Document`] / [`Item`]: the document schema and its canonical form
//! - [`UpsertCoordinator`]: find-or-create, then merge-or-insert, in one
//!   store transaction
//! - [`KeyLocks`]: per-master-key exclusion used by serialized coordinators
//!
//! Matching and merging are internal steps of an upsert and are not
//! exposed on their own.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod key_lock;
mod matcher;
mod merge;
pub mod upsert;

pub use document::{fields, Document, Item};
pub use key_lock::{KeyGuard, KeyLocks};
pub use upsert::UpsertCoordinator;
