//! Unified error type for tracedoc.
//!
//! Wraps the errors of the internal crates behind one stable interface and
//! adds the failures only the facade can hit (I/O, configuration).

use thiserror::Error;
use tracedoc_core::StorageId;

/// All tracedoc errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder has no representation for a value
    #[error("unencodable type: {type_name}")]
    UnencodableType {
        /// Type of the offending value
        type_name: String,
    },

    /// A value of a known kind could not be represented
    #[error("cannot encode {type_name}: {reason}")]
    InvalidPayload {
        /// Kind of value being encoded
        type_name: String,
        /// What went wrong
        reason: String,
    },

    /// Document failed validation
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A stored payload does not fit the document schema
    #[error("malformed stored payload: {reason}")]
    MalformedStoredPayload {
        /// Record the payload came from, when known
        storage_id: Option<StorageId>,
        /// What is wrong with it
        reason: String,
    },

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Concurrent modification detected at commit
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for tracedoc operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Conflicts and store outages may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::StoreUnavailable(_))
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if the encoder rejected a value.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::UnencodableType { .. } | Error::InvalidPayload { .. }
        )
    }
}

// Convert from internal core errors
impl From<tracedoc_core::Error> for Error {
    fn from(e: tracedoc_core::Error) -> Self {
        use tracedoc_core::Error as CoreError;
        match e {
            CoreError::UnencodableType { type_name } => Error::UnencodableType { type_name },
            CoreError::InvalidPayload { type_name, reason } => Error::InvalidPayload {
                type_name: type_name.to_string(),
                reason,
            },
            CoreError::InvalidDocument(msg) => Error::InvalidDocument(msg),
            CoreError::MalformedStoredPayload { storage_id, reason } => {
                let reason = match storage_id {
                    Some(id) => format!("record {}: {}", id, reason),
                    None => reason,
                };
                Error::MalformedStoredPayload { storage_id, reason }
            }
            CoreError::StoreUnavailable(msg) => Error::StoreUnavailable(msg),
            CoreError::RecordNotFound(id) => Error::NotFound(format!("record {}", id)),
            CoreError::Conflict(msg) => Error::Conflict(msg),
            CoreError::Storage(msg) => Error::Storage(msg),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
