//! Unified error handling for the cart store.
//!
//! Every fallible cart operation returns [`Result<T>`]. Storage failures are
//! surfaced unchanged; the store never retries and never rolls back its
//! in-memory state after a failed write.

use thiserror::Error;

use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested from a context that never received a store.
    #[error("Cart not initialized: no cart store was provided to this context")]
    NotInitialized,

    /// A store was provided to a context that already holds one.
    #[error("Cart already provided to this context")]
    AlreadyProvided,

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Persisted cart data could not be decoded.
    #[error("Corrupt cart data: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The cart could not be encoded for storage.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Persisted cart data was written by a newer schema.
    #[error("Unsupported cart schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion {
        /// Version found in storage.
        found: u32,
        /// Latest version this build reads.
        supported: u32,
    },
}

impl CartError {
    /// Whether the error came from the storage backend.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Whether the error means the persisted cart cannot be read.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_) | Self::UnsupportedSchemaVersion { .. })
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
