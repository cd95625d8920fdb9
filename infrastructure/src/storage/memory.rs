//! In-memory storage adapter
//!
//! A flat path→bytes map behind a mutex. Useful for demos and as a drop-in
//! storage backend when nothing should touch disk.

use agentry_application::ports::storage::{StorageEntry, StorageError, StoragePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn list_entries(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let files = self.files.lock().expect("storage lock poisoned");
        Ok(files
            .iter()
            .filter_map(|(stored, (bytes, modified_at))| {
                stored.strip_prefix(&prefix).map(|name| StorageEntry {
                    name: name.to_string(),
                    size: bytes.len() as u64,
                    modified_at: *modified_at,
                })
            })
            .collect())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .lock()
            .expect("storage lock poisoned")
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.files
            .lock()
            .expect("storage lock poisoned")
            .insert(path.to_string(), (bytes.to_vec(), Utc::now()));
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self
            .files
            .lock()
            .expect("storage lock poisoned")
            .remove(path)
            .is_some())
    }

    async fn mkdir_recursive(&self, _path: &str) -> Result<(), StorageError> {
        // Directories are implicit in the flat map.
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self
            .files
            .lock()
            .expect("storage lock poisoned")
            .contains_key(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_strips_the_folder_prefix() {
        let storage = MemoryStorage::new();
        storage.write("org/agents/a/private/x.txt", b"1").await.unwrap();
        storage
            .write("org/agents/a/private/sub/y.txt", b"22")
            .await
            .unwrap();
        storage.write("org/agents/b/private/z.txt", b"3").await.unwrap();

        let mut names: Vec<String> = storage
            .list_entries("org/agents/a/private")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["sub/y.txt", "x.txt"]);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let storage = MemoryStorage::new();
        storage.write("a.txt", b"x").await.unwrap();
        assert!(storage.delete("a.txt").await.unwrap());
        assert!(!storage.delete("a.txt").await.unwrap());
    }
}
