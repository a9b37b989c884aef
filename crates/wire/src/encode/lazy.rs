//! Lazily produced sequences

use std::cell::RefCell;
use std::fmt;

use tracedoc_core::{Error, Result, Value};

use super::Encodable;

/// A finite iterator that encodes as a fully materialized array
///
/// The iterator is drained exactly once, by the first encode. Encoding the
/// same `LazySeq` again fails with [`Error::InvalidPayload`] instead of
/// silently producing an empty array.
pub struct LazySeq<I> {
    iter: RefCell<Option<I>>,
}

impl<I> LazySeq<I> {
    /// Wrap an iterator
    pub fn new(iter: I) -> Self {
        LazySeq {
            iter: RefCell::new(Some(iter)),
        }
    }

    /// Whether the sequence has already been drained
    pub fn is_consumed(&self) -> bool {
        self.iter.borrow().is_none()
    }
}

impl<I> fmt::Debug for LazySeq<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySeq")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

impl<I> Encodable for LazySeq<I>
where
    I: Iterator,
    I::Item: Encodable,
{
    fn encode(&self) -> Result<Value> {
        let iter = self
            .iter
            .borrow_mut()
            .take()
            .ok_or_else(|| Error::invalid_payload("LazySeq", "sequence already consumed"))?;
        iter.map(|item| item.encode())
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}
