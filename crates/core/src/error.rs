//! Error types for the record store
//!
//! Every failure of the store and the service facade is one of the variants
//! below. We use `thiserror` for `Display` and `Error` implementations.
//!
//! | Variant | Meaning | Caller action |
//! |---------|---------|---------------|
//! | `InvalidId` | id is not a positive integer | fix the input |
//! | `NotFound` | no version exists for the id | create instead |
//! | `AlreadyExists` | create on an id with history | update instead |
//! | `InvalidDate` | effective date outside years 0001..=9999 | fix the input |
//! | `Serialization` | JSON encode/decode of stored maps failed | internal |
//! | `StorageUnavailable` | persistence unreachable or write failed | internal |

use thiserror::Error;

/// Result type alias for record store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Identifier is not a positive integer
    #[error("invalid record id: {id}")]
    InvalidId {
        /// The rejected input, as given
        id: String,
    },

    /// No version exists for the record
    #[error("record not found: {id}")]
    NotFound {
        /// Requested record id
        id: i64,
    },

    /// Create was called for a record that already has a version
    #[error("record already exists: {id}")]
    AlreadyExists {
        /// Conflicting record id
        id: i64,
    },

    /// Effective date outside the supported calendar range
    #[error("invalid effective date: {date}")]
    InvalidDate {
        /// The rejected date
        date: String,
    },

    /// Encoding or decoding of record data failed
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying failure
        reason: String,
    },

    /// The persistence medium is unreachable or rejected a write
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Underlying failure
        reason: String,
    },
}

impl Error {
    /// Create a serialization error
    pub fn serialization(reason: impl Into<String>) -> Self {
        Error::Serialization {
            reason: reason.into(),
        }
    }

    /// Create a storage error
    pub fn storage(reason: impl Into<String>) -> Self {
        Error::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input or the record's state
    ///
    /// Internal errors (serialization, storage) return false; their detail
    /// must not be exposed to external callers.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidId { .. }
                | Error::NotFound { .. }
                | Error::AlreadyExists { .. }
                | Error::InvalidDate { .. }
        )
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
