//! Local-disk storage adapter
//!
//! Maps the flat '/'-joined paths of the storage port onto a directory
//! tree under a fixed root. Listing walks recursively and reports each
//! file under its relative path, matching the flat-listing contract.

use agentry_application::ports::storage::{StorageEntry, StorageError, StoragePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            resolved.push(part);
        }
        resolved
    }
}

#[async_trait]
impl StoragePort for LocalStorage {
    async fn list_entries(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let base = self.resolve(path);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut pending = vec![base.clone()];
        while let Some(dir) = pending.pop() {
            let mut reader = fs::read_dir(&dir).await.map_err(io_error)?;
            while let Some(entry) = reader.next_entry().await.map_err(io_error)? {
                let entry_path = entry.path();
                let metadata = entry.metadata().await.map_err(io_error)?;
                if metadata.is_dir() {
                    pending.push(entry_path);
                    continue;
                }
                entries.push(StorageEntry {
                    name: relative_name(&base, &entry_path),
                    size: metadata.len(),
                    modified_at: metadata
                        .modified()
                        .map(DateTime::<Utc>::from)
                        .unwrap_or_else(|_| Utc::now()),
                });
            }
        }
        Ok(entries)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.resolve(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(io_error(e)),
        }
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::write(self.resolve(path), bytes).await.map_err(io_error)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn mkdir_recursive(&self, path: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.resolve(path)).await.map_err(io_error)
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        fs::try_exists(self.resolve(path)).await.map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> StorageError {
    StorageError::Io(err.to_string())
}

/// Relative path of `file` under `base`, '/'-joined regardless of platform.
fn relative_name(base: &Path, file: &Path) -> String {
    file.strip_prefix(base)
        .unwrap_or(file)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
