//! TTL-bound cache mapping opaque folder handles to storage locations
//!
//! The one genuinely hot shared mutable structure in the engine: written on
//! every folder discovery and read on every subsequent file operation from
//! potentially many concurrent agents. Expired entries are swept lazily on
//! insert and by the periodic sweeper the service spawns; callers never
//! trigger cleanup explicitly.

use agentry_domain::{FolderGrant, WorkspaceError};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct HandleEntry {
    path: String,
    grant: FolderGrant,
    issued_at: Instant,
}

/// Concurrent handle→location cache with a fixed TTL.
#[derive(Debug)]
pub struct HandleCache {
    entries: RwLock<HashMap<String, HandleEntry>>,
    ttl: Duration,
}

impl HandleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh opaque handle for a resolved folder.
    pub fn issue(&self, path: impl Into<String>, grant: FolderGrant) -> String {
        let token = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().expect("handle cache lock poisoned");
        // Opportunistic sweep keeps the map from accumulating dead entries
        // between sweeper ticks.
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);
        entries.insert(
            token.clone(),
            HandleEntry {
                path: path.into(),
                grant,
                issued_at: now,
            },
        );
        token
    }

    /// Resolve a handle to its storage path and grant.
    ///
    /// Expired and unknown handles produce the same distinct
    /// [`WorkspaceError::HandleExpired`] — never a generic not-found — so
    /// the caller knows to re-run discovery.
    pub fn resolve(&self, token: &str) -> Result<(String, FolderGrant), WorkspaceError> {
        let expired = {
            let entries = self.entries.read().expect("handle cache lock poisoned");
            match entries.get(token) {
                None => return Err(WorkspaceError::HandleExpired),
                Some(entry) => {
                    if Instant::now().duration_since(entry.issued_at) < self.ttl {
                        return Ok((entry.path.clone(), entry.grant.clone()));
                    }
                    true
                }
            }
        };
        if expired {
            self.entries
                .write()
                .expect("handle cache lock poisoned")
                .remove(token);
        }
        Err(WorkspaceError::HandleExpired)
    }

    /// Drop all expired entries, returning how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().expect("handle cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            trace!(evicted, "evicted expired folder handles");
        }
        evicted
    }

    /// Number of live (possibly expired, not yet swept) entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("handle cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
