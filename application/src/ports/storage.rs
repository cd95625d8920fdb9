//! Storage port
//!
//! The persistence collaborator for workspace content. Any backend
//! satisfying this shape works: local disk, an object store, or the
//! in-memory double used in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// One stored file as reported by `list_entries`.
#[derive(Debug, Clone)]
pub struct StorageEntry {
    /// Name relative to the listed path. Files in subdirectories carry
    /// their relative prefix joined with '/' (flat listing, no folder
    /// structure inference).
    pub name: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// Errors raised by storage adapters.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("storage path not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(String),
}

/// Port for workspace file persistence.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Flat recursive listing under `path`. A missing path yields an empty
    /// list, not an error — workspace folders exist lazily.
    async fn list_entries(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Returns whether the file existed.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    async fn mkdir_recursive(&self, path: &str) -> Result<(), StorageError>;

    async fn exists(&self, path: &str) -> Result<bool, StorageError>;
}
