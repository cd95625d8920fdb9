//! Workspace listing value objects

use super::scope::FolderScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file visible inside a discovered folder.
///
/// Subfolders are not separately enumerated: a file conceptually stored in
/// "reports/" surfaces as a single entry whose name carries the relative
/// prefix (e.g. "reports/q3.md").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Filename relative to the folder root, possibly prefix-embedded
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
    /// Best-effort MIME guess from the extension
    pub mime_type: String,
}

/// A discovered folder plus its contents and a fresh opaque handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListing {
    /// Opaque handle for subsequent file operations; expires after the
    /// service's TTL
    pub handle: String,
    /// The scope the folder was discovered through
    pub scope: FolderScope,
    /// Human-readable label (e.g. "shared workspace of agent Ada")
    pub label: String,
    pub files: Vec<FileEntry>,
}

/// Outcome of a write operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWriteReceipt {
    pub bytes_written: usize,
    /// True if the file did not previously exist
    pub created: bool,
}

/// Outcome of a delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDeleteReceipt {
    /// True if the file existed before deletion
    pub existed: bool,
}

/// Guess a MIME type from a filename extension.
///
/// Unknown extensions fall back to `application/octet-stream`.
pub fn guess_mime_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .filter(|ext| *ext != filename)
        .unwrap_or("");

    match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "js" => "text/javascript",
        "py" | "rs" | "go" | "java" | "c" | "h" => "text/plain",
        _ => "application/octet-stream",
    }
}
