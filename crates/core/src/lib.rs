//! Core types for tracedoc
//!
//! This crate defines the types every other crate builds on:
//! - [`Value`]: the canonical interchange form stores persist
//! - [`MasterKey`], [`RecordKey`], [`StorageId`]: UUID-backed identifiers
//! - [`Error`]: the shared error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{MasterKey, RecordKey, StorageId};
pub use value::{SpecialFloatKind, Value};
