//! Raw byte sequences

use tracedoc_core::{Error, Result, Value};

use super::Encodable;

/// An owned byte sequence that encodes as UTF-8 text
///
/// `Vec<u8>` already encodes as an array of integers, so raw bytes that
/// should become text are wrapped in `Bytes`. Invalid UTF-8 fails with
/// [`Error::InvalidPayload`]; nothing is replaced lossily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wrap a byte vector
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    /// Borrow the raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the raw bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl Encodable for Bytes {
    fn encode(&self) -> Result<Value> {
        decode_utf8(&self.0).map(Value::String)
    }
}

pub(crate) fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::invalid_payload("Bytes", format!("not valid UTF-8: {}", e)))
}
