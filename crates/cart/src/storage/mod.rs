//! Key-value storage for persisted carts.
//!
//! The cart treats storage as an external blob store: one text value per
//! string key, last write wins. [`KeyValueStore`] is the whole contract;
//! two backends ship with the crate:
//!
//! - [`MemoryStore`] - process-local map, used in tests and as a fallback
//! - [`FileStore`] - JSON file on local disk, written through on every `set`

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached or failed to read/write.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend has no room for the value.
    #[error("storage full: writing {needed} bytes for key '{key}' exceeds the {available} bytes available")]
    Full {
        /// Key being written.
        key: String,
        /// Bytes the write needed.
        needed: usize,
        /// Bytes left in the backend.
        available: usize,
    },
}

/// Async text storage addressed by string keys.
///
/// Implementations must be shareable across tasks. Values are opaque text;
/// a `set` fully replaces any previous value for the key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing was written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
