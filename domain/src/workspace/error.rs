//! Workspace access errors

use super::scope::FileOperation;
use thiserror::Error;

/// Errors raised by workspace access operations.
///
/// `HandleExpired` is deliberately distinct from `FileNotFound`: a stale or
/// unknown handle instructs the caller to re-run folder discovery, while a
/// missing file is about the folder's contents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error(
        "folder handle has expired or is unknown; call list_folders again to obtain a fresh handle"
    )]
    HandleExpired,

    #[error("{operation} access to this folder is denied for agent '{agent_id}'")]
    AccessDenied {
        operation: FileOperation,
        agent_id: String,
    },

    #[error("file '{name}' not found in this folder")]
    FileNotFound { name: String },

    #[error("invalid filename '{name}': names must stay within the folder")]
    InvalidFilename { name: String },

    #[error("write would create storage outside the caller's workspace boundary")]
    OutsideBoundary,

    #[error("storage error: {0}")]
    Storage(String),
}

impl WorkspaceError {
    /// Whether the error can be surfaced to the model as conversation
    /// content (all workspace errors are recoverable).
    pub fn is_handle_expiry(&self) -> bool {
        matches!(self, WorkspaceError::HandleExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_expiry_message_is_actionable() {
        let err = WorkspaceError::HandleExpired;
        assert!(err.is_handle_expiry());
        assert!(err.to_string().contains("list_folders"));
    }

    #[test]
    fn test_access_denied_names_operation() {
        let err = WorkspaceError::AccessDenied {
            operation: FileOperation::Write,
            agent_id: "agent-1".to_string(),
        };
        assert!(err.to_string().contains("write"));
        assert!(!err.is_handle_expiry());
    }
}
