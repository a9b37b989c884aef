//! Canonical encoder
//!
//! Reduces Rust values to the [`Value`](tracedoc_core::Value) tree stores
//! persist. Dispatch is static: each value kind has its own [`Encodable`]
//! impl, enumerations opt in through [`Enumeration`], and anything else
//! serde can describe goes through [`Structural`].

mod bytes;
mod encodable;
mod enumeration;
mod lazy;
mod row;
mod scalar;
mod structural;

pub use bytes::Bytes;
pub use encodable::{encode, Encodable};
pub use enumeration::Enumeration;
pub use lazy::LazySeq;
pub use row::Row;
pub use structural::{encode_structural, Structural};
