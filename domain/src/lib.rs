//! Domain layer for agentry
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Three-level access control
//!
//! An organization owns the full tool catalog (the whitelist ceiling). Teams
//! and agents each carry an optional blacklist subtracted from that catalog.
//! The intersection of all three is an agent's *effective tool set* — an
//! agent-level blacklist can never re-enable a team-blocked tool.
//!
//! ## Scoped workspaces
//!
//! Agents see a shared filesystem only through five named visibility scopes
//! (`my_private`, `my_shared`, `team_private`, `team_shared`, `org_shared`).
//! Discovery hands out short-lived opaque folder handles; raw storage paths
//! never cross the domain boundary.

pub mod context;
pub mod conversation;
pub mod directory;
pub mod permission;
pub mod tool;
pub mod workspace;

// Re-export commonly used types
pub use context::{ExecutionContext, SecurityViolation};
pub use conversation::{Conversation, ConversationError, ConversationMessage};
pub use directory::entities::{Agent, Organization, Team};
pub use permission::{PermissionError, assert_access, available_tools, has_access};
pub use tool::{
    entities::{ToolCall, ToolDefinition, empty_object_schema},
    value_objects::{ToolError, render_primary_content},
};
pub use workspace::{
    entities::{FileDeleteReceipt, FileEntry, FileWriteReceipt, FolderListing, guess_mime_type},
    error::WorkspaceError,
    scope::{
        FileOperation, FolderGrant, FolderOwner, FolderScope, Visibility, WorkspaceActor,
        operation_allowed,
    },
};
