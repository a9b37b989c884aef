//! Error taxonomy shared by every tracedoc crate
//!
//! | Variant | Raised by | Effect |
//! |---------|-----------|--------|
//! | `UnencodableType` | encoder | aborts the whole upsert |
//! | `InvalidPayload` | encoder | aborts the whole upsert |
//! | `InvalidDocument` | document construction | rejected before any store call |
//! | `MalformedStoredPayload` | decode of a stored record | surfaced, never skipped |
//! | `StoreUnavailable` | external store transport | propagated, no retry |
//! | `RecordNotFound` | replace/get by storage id | transaction rolled back |
//! | `Conflict` | commit validation | transaction rolled back, retryable |
//! | `Storage` | local persistence | transaction rolled back |

use crate::types::StorageId;
use thiserror::Error;

/// Result type alias for tracedoc operations
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by the core crates
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder has no representation for this type
    #[error("unencodable type: {type_name}")]
    UnencodableType {
        /// Rust type name of the offending value
        type_name: String,
    },

    /// A value of a known kind could not be represented
    #[error("cannot encode {type_name}: {reason}")]
    InvalidPayload {
        /// Kind of value being encoded
        type_name: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Document failed construction-time validation
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A stored payload does not satisfy the document schema
    #[error("malformed stored payload{}: {reason}", in_record(.storage_id))]
    MalformedStoredPayload {
        /// Record the payload came from, when known
        storage_id: Option<StorageId>,
        /// What is wrong with it
        reason: String,
    },

    /// The external store could not be reached or failed mid-transaction
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// No record with this storage id
    #[error("record not found: {0}")]
    RecordNotFound(StorageId),

    /// First-committer-wins validation failed
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// Local persistence failure
    #[error("storage error: {0}")]
    Storage(String),
}

fn in_record(storage_id: &Option<StorageId>) -> String {
    match storage_id {
        Some(id) => format!(" in record {}", id),
        None => String::new(),
    }
}

impl Error {
    /// Shorthand for [`Error::UnencodableType`]
    pub fn unencodable(type_name: impl Into<String>) -> Self {
        Error::UnencodableType {
            type_name: type_name.into(),
        }
    }

    /// Shorthand for [`Error::InvalidPayload`]
    pub fn invalid_payload(type_name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidPayload {
            type_name,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::MalformedStoredPayload`]
    pub fn malformed(storage_id: Option<StorageId>, reason: impl Into<String>) -> Self {
        Error::MalformedStoredPayload {
            storage_id,
            reason: reason.into(),
        }
    }

    /// Whether retrying the operation with fresh data may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::StoreUnavailable(_))
    }

    /// Whether this error came from the encoder
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::UnencodableType { .. } | Error::InvalidPayload { .. }
        )
    }

    /// Attach a storage id to a malformed-payload error that lacks one
    pub fn with_storage_id(self, id: StorageId) -> Self {
        match self {
            Error::MalformedStoredPayload {
                storage_id: None,
                reason,
            } => Error::MalformedStoredPayload {
                storage_id: Some(id),
                reason,
            },
            other => other,
        }
    }
}
