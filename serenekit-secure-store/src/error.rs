//! Error types for secure storage primitives.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by secure storage primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Refused to store an empty value; absence is represented by deleting.
    #[error("cannot store empty data")]
    EmptyValue,

    /// Errors coming from the platform key-value store.
    #[error("secure store error: {0}")]
    Backend(String),

    /// A single value exceeded the backend's per-key limit.
    #[error("value for {key} too large: {len} characters exceeds {max}")]
    ValueTooLarge {
        /// Key the write was attempted against.
        key: String,
        /// Length of the rejected value, in characters.
        len: usize,
        /// Maximum length the backend accepts.
        max: usize,
    },

    /// Serialization/deserialization failures of stored values.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Errors coming from the per-key lock.
    #[error("storage lock error: {0}")]
    Lock(String),
}
