//! # Store Error Types
//!
//! All errors that can occur while talking to a key-value backend.

use thiserror::Error;

/// Errors that can occur in a key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The key holds a value of a different shape than the operation expects.
    #[error("wrong type for key {key}")]
    WrongType {
        /// The offending key.
        key: String,
    },

    /// A stored value could not be interpreted (e.g. a non-numeric counter).
    #[error("invalid value {value:?} at key {key}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// The raw stored value.
        value: String,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
