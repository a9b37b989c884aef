//! Storage layer for tracedoc
//!
//! This crate defines the capability the upsert engine needs from a store
//! and two implementations of it:
//! - [`DocumentStore`] / [`Transaction`]: closure-scoped transactions over
//!   a collection of [`StoredRecord`]s
//! - [`Predicate`]: structural containment lookup
//! - [`MemoryStore`]: snapshot reads, buffered writes, first-committer-wins
//! - [`FileStore`]: a `MemoryStore` persisted as one JSON file per collection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod predicate;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use predicate::{contains, Predicate};
pub use store::{DocumentStore, StoredRecord, Transaction};
