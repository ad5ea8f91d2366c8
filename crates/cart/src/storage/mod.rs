//! Key-value storage for the persisted cart.
//!
//! The cart is stored as one JSON-encoded array under a single key. Backends
//! only deal in strings; (de)serialization stays in [`crate::CartStore`].
//!
//! - [`MemoryStore`] - process-local map, clones share data
//! - [`JsonFileStore`] - every key in one JSON object file

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backing data exists but is not in the expected format.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),
}

/// A string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`; returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
