//! Workspace access service
//!
//! Grants agents folder-based, capability-scoped visibility into shared
//! storage. Discovery resolves a [`FolderScope`] into concrete folders,
//! enumerates their contents, and hands out short-lived opaque handles;
//! every subsequent operation resolves its handle through the TTL cache and
//! re-checks the scope permission matrix before touching storage. Raw
//! storage paths never leave this module.

mod handle_cache;

pub use handle_cache::HandleCache;

use crate::ports::directory::{DirectoryError, DirectoryPort};
use crate::ports::storage::{StorageError, StoragePort};
use agentry_domain::{
    ExecutionContext, FileDeleteReceipt, FileEntry, FileOperation, FileWriteReceipt, FolderGrant,
    FolderListing, FolderOwner, FolderScope, Visibility, WorkspaceActor, WorkspaceError,
    guess_mime_type, operation_allowed,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default handle lifetime. A policy constant, not load-bearing logic —
/// override it through [`WorkspaceConfig`].
pub const DEFAULT_HANDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Tuning knobs for the workspace service.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// How long an issued folder handle stays valid
    pub handle_ttl: Duration,
    /// How often the background sweeper evicts expired handles
    pub sweep_interval: Duration,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            handle_ttl: DEFAULT_HANDLE_TTL,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Scoped access to workspace folders, backed by a storage port and the
/// directory snapshot.
pub struct WorkspaceService {
    storage: Arc<dyn StoragePort>,
    directory: Arc<dyn DirectoryPort>,
    cache: Arc<HandleCache>,
    sweep_interval: Duration,
}

impl WorkspaceService {
    pub fn new(
        storage: Arc<dyn StoragePort>,
        directory: Arc<dyn DirectoryPort>,
        config: WorkspaceConfig,
    ) -> Self {
        Self {
            storage,
            directory,
            cache: Arc::new(HandleCache::new(config.handle_ttl)),
            sweep_interval: config.sweep_interval,
        }
    }

    /// Spawn the periodic eviction task for expired handles.
    ///
    /// Runs until the returned handle is aborted or the runtime shuts down.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let interval = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                cache.evict_expired();
            }
        })
    }

    /// Resolve a scope into folders, enumerate their files, and issue a
    /// fresh handle per folder.
    pub async fn list_folders(
        &self,
        scope: FolderScope,
        ctx: &ExecutionContext,
    ) -> Result<Vec<FolderListing>, WorkspaceError> {
        let agent = self
            .directory
            .get_agent(&ctx.agent_id)
            .await
            .map_err(directory_error)?;
        let org_id = agent.organization_id.clone();

        let mut resolved: Vec<(String, FolderGrant, String)> = Vec::new();
        match scope {
            FolderScope::MyPrivate => {
                resolved.push(self.agent_folder(&org_id, &agent.id, Visibility::Private));
            }
            FolderScope::MyShared => {
                resolved.push(self.agent_folder(&org_id, &agent.id, Visibility::Shared));
            }
            FolderScope::TeamPrivate | FolderScope::TeamShared => {
                // No team membership resolves to an empty result, not an error.
                if let Some(team_id) = &agent.team_id {
                    let team = self
                        .directory
                        .get_team(team_id)
                        .await
                        .map_err(directory_error)?;
                    let visibility = if scope == FolderScope::TeamPrivate {
                        Visibility::Private
                    } else {
                        Visibility::Shared
                    };
                    resolved.push(self.team_folder(&org_id, &team.id, &team.name, visibility));
                }
            }
            FolderScope::OrgShared => {
                // Aggregation of every team's shared folder plus every
                // other agent's shared folder. The requester's own shared
                // workspace is excluded — that case is my_shared.
                for team in self
                    .directory
                    .list_teams(&org_id)
                    .await
                    .map_err(directory_error)?
                {
                    resolved.push(self.team_folder(&org_id, &team.id, &team.name, Visibility::Shared));
                }
                for other in self
                    .directory
                    .list_agents(&org_id)
                    .await
                    .map_err(directory_error)?
                {
                    if other.id == agent.id {
                        continue;
                    }
                    let (path, grant, _) =
                        self.agent_folder(&org_id, &other.id, Visibility::Shared);
                    resolved.push((path, grant, format!("shared workspace of agent {}", other.name)));
                }
            }
        }

        let mut listings = Vec::with_capacity(resolved.len());
        for (path, grant, label) in resolved {
            let files = self.enumerate(&path).await?;
            let handle = self.cache.issue(path, grant);
            listings.push(FolderListing {
                handle,
                scope,
                label,
                files,
            });
        }
        debug!(
            scope = %scope,
            agent_id = %ctx.agent_id,
            folders = listings.len(),
            "resolved folder scope"
        );
        Ok(listings)
    }

    /// Read a file through a previously issued handle.
    pub async fn read_file(
        &self,
        handle: &str,
        filename: &str,
        ctx: &ExecutionContext,
    ) -> Result<String, WorkspaceError> {
        let path = self
            .authorize(handle, filename, FileOperation::Read, ctx)
            .await?;
        match self.storage.read(&path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(StorageError::NotFound(_)) => Err(WorkspaceError::FileNotFound {
                name: filename.to_string(),
            }),
            Err(err) => Err(storage_error(err)),
        }
    }

    /// Write (create or overwrite) a file through a handle.
    ///
    /// The destination folder is created on demand — but only inside the
    /// workspace boundary the handle's grant covers.
    pub async fn write_file(
        &self,
        handle: &str,
        filename: &str,
        content: &str,
        ctx: &ExecutionContext,
    ) -> Result<FileWriteReceipt, WorkspaceError> {
        let path = self
            .authorize(handle, filename, FileOperation::Write, ctx)
            .await?;
        if let Some(parent) = path.rsplit_once('/').map(|(dir, _)| dir) {
            self.storage
                .mkdir_recursive(parent)
                .await
                .map_err(storage_error)?;
        }
        let created = !self.storage.exists(&path).await.map_err(storage_error)?;
        self.storage
            .write(&path, content.as_bytes())
            .await
            .map_err(storage_error)?;
        info!(
            agent_id = %ctx.agent_id,
            filename = %filename,
            bytes = content.len(),
            created,
            "workspace file written"
        );
        Ok(FileWriteReceipt {
            bytes_written: content.len(),
            created,
        })
    }

    /// Delete a file through a handle. Deleting a missing file is reported
    /// through the receipt, not an error.
    pub async fn delete_file(
        &self,
        handle: &str,
        filename: &str,
        ctx: &ExecutionContext,
    ) -> Result<FileDeleteReceipt, WorkspaceError> {
        let path = self
            .authorize(handle, filename, FileOperation::Delete, ctx)
            .await?;
        let existed = self.storage.delete(&path).await.map_err(storage_error)?;
        Ok(FileDeleteReceipt { existed })
    }

    /// Metadata for a single file inside a handled folder.
    pub async fn stat_file(
        &self,
        handle: &str,
        filename: &str,
        ctx: &ExecutionContext,
    ) -> Result<FileEntry, WorkspaceError> {
        // Stat is a read in the permission matrix.
        let (folder, _) = self.resolve_checked(handle, filename, FileOperation::Read, ctx).await?;
        let entries = self.enumerate(&folder).await?;
        entries
            .into_iter()
            .find(|entry| entry.name == filename)
            .ok_or_else(|| WorkspaceError::FileNotFound {
                name: filename.to_string(),
            })
    }

    // ─── Internals ───────────────────────────────────────────────

    fn agent_folder(
        &self,
        org_id: &str,
        agent_id: &str,
        visibility: Visibility,
    ) -> (String, FolderGrant, String) {
        let dir = visibility_dir(visibility);
        let path = format!("{}/agents/{}/{}", org_id, agent_id, dir);
        let grant = FolderGrant {
            owner: FolderOwner::Agent {
                agent_id: agent_id.to_string(),
            },
            visibility,
            organization_id: org_id.to_string(),
        };
        (path, grant, format!("your {} workspace", dir))
    }

    fn team_folder(
        &self,
        org_id: &str,
        team_id: &str,
        team_name: &str,
        visibility: Visibility,
    ) -> (String, FolderGrant, String) {
        let dir = visibility_dir(visibility);
        let path = format!("{}/teams/{}/{}", org_id, team_id, dir);
        let grant = FolderGrant {
            owner: FolderOwner::Team {
                team_id: team_id.to_string(),
            },
            visibility,
            organization_id: org_id.to_string(),
        };
        (path, grant, format!("{} workspace of team {}", dir, team_name))
    }

    /// Resolve handle + actor, enforce the permission matrix, and return
    /// the full storage path of `filename`.
    async fn authorize(
        &self,
        handle: &str,
        filename: &str,
        op: FileOperation,
        ctx: &ExecutionContext,
    ) -> Result<String, WorkspaceError> {
        let (folder, _) = self.resolve_checked(handle, filename, op, ctx).await?;
        Ok(format!("{}/{}", folder, filename))
    }

    async fn resolve_checked(
        &self,
        handle: &str,
        filename: &str,
        op: FileOperation,
        ctx: &ExecutionContext,
    ) -> Result<(String, FolderGrant), WorkspaceError> {
        validate_filename(filename, op)?;
        // Handle resolution comes before the permission check so a stale
        // handle always reports expiry, never a misleading denial.
        let (folder, grant) = self.cache.resolve(handle)?;
        let actor = self.actor(ctx).await?;
        if !operation_allowed(&grant, &actor, op) {
            debug!(
                agent_id = %ctx.agent_id,
                operation = %op,
                correlation_id = %ctx.correlation_id,
                "workspace operation denied by scope rules"
            );
            return Err(WorkspaceError::AccessDenied {
                operation: op,
                agent_id: ctx.agent_id.clone(),
            });
        }
        Ok((folder, grant))
    }

    async fn actor(&self, ctx: &ExecutionContext) -> Result<WorkspaceActor, WorkspaceError> {
        let agent = self
            .directory
            .get_agent(&ctx.agent_id)
            .await
            .map_err(directory_error)?;
        let mut actor = WorkspaceActor::new(agent.id, agent.organization_id);
        if let Some(team_id) = agent.team_id {
            actor = actor.with_team(team_id);
        }
        Ok(actor)
    }

    async fn enumerate(&self, path: &str) -> Result<Vec<FileEntry>, WorkspaceError> {
        let entries = match self.storage.list_entries(path).await {
            Ok(entries) => entries,
            // Folders exist lazily; an unknown path is an empty folder.
            Err(StorageError::NotFound(_)) => Vec::new(),
            Err(err) => return Err(storage_error(err)),
        };
        let mut files: Vec<FileEntry> = entries
            .into_iter()
            .map(|entry| {
                let mime_type = guess_mime_type(&entry.name).to_string();
                FileEntry {
                    name: entry.name,
                    size: entry.size,
                    modified_at: entry.modified_at,
                    mime_type,
                }
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

fn visibility_dir(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Private => "private",
        Visibility::Shared => "shared",
    }
}

/// Reject names that would escape the handled folder.
///
/// Nested relative names ("reports/q3.md") are allowed — they stay within
/// the workspace boundary. Traversal on a write is an attempt to create
/// storage outside any legitimate scope and is reported as such.
fn validate_filename(name: &str, op: FileOperation) -> Result<(), WorkspaceError> {
    let escapes = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if escapes {
        if op == FileOperation::Write {
            return Err(WorkspaceError::OutsideBoundary);
        }
        return Err(WorkspaceError::InvalidFilename {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn directory_error(err: DirectoryError) -> WorkspaceError {
    WorkspaceError::Storage(format!("directory lookup failed: {}", err))
}

fn storage_error(err: StorageError) -> WorkspaceError {
    WorkspaceError::Storage(err.to_string())
}
