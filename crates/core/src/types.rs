//! Identifier types
//!
//! - [`MasterKey`]: groups every write belonging to one logical trace
//! - [`RecordKey`]: identifies one write/session of a document
//! - [`StorageId`]: opaque id a store assigns to a persisted record
//!
//! All three wrap a UUID and render in canonical hyphenated form.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random id using UUID v4
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                $name(uuid)
            }

            /// Create from raw bytes
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                $name(Uuid::from_bytes(bytes))
            }

            /// The wrapped UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Raw bytes representation
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Parse from text, rejecting malformed and nil UUIDs
            pub fn parse(s: &str) -> Result<Self> {
                let uuid = Uuid::parse_str(s.trim()).map_err(|e| {
                    Error::InvalidDocument(format!(
                        "{} is not a valid {}: {}",
                        s,
                        stringify!($name),
                        e
                    ))
                })?;
                Self::checked(uuid)
            }

            /// Wrap a UUID, rejecting the nil UUID
            pub fn checked(uuid: Uuid) -> Result<Self> {
                if uuid.is_nil() {
                    return Err(Error::InvalidDocument(format!(
                        "{} must not be the nil UUID",
                        stringify!($name)
                    )));
                }
                Ok($name(uuid))
            }

            /// Whether this id wraps the nil UUID
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier grouping every record of one logical trace
    ///
    /// Immutable once a document exists; the only field used to match
    /// a candidate against stored records.
    MasterKey
);

uuid_id!(
    /// Identifier for one write/session of a document
    ///
    /// Informational only, never used for matching.
    RecordKey
);

uuid_id!(
    /// Opaque identifier assigned by a store on first insert
    ///
    /// Stable across every later replace of the same logical document.
    StorageId
);
