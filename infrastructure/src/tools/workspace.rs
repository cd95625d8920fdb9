//! Workspace file tools
//!
//! Thin executors over the [`WorkspaceService`]: argument parsing, error
//! mapping to tool-error codes, and human-readable result rendering. All
//! scope and permission decisions stay in the service.

use agentry_application::ports::tool_handler::ToolHandler;
use agentry_application::workspace::WorkspaceService;
use agentry_domain::{
    ExecutionContext, FolderScope, ToolDefinition, ToolError, WorkspaceError,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

fn require_str<'a>(
    arguments: &'a HashMap<String, Value>,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::invalid_argument(format!("missing required argument '{key}'")))
}

fn map_workspace_error(err: WorkspaceError) -> ToolError {
    match err {
        WorkspaceError::HandleExpired => ToolError::handle_expired(),
        WorkspaceError::AccessDenied { .. } => ToolError::permission_denied(err.to_string()),
        WorkspaceError::FileNotFound { ref name } => ToolError::not_found(name.clone()),
        WorkspaceError::InvalidFilename { .. } | WorkspaceError::OutsideBoundary => {
            ToolError::invalid_argument(err.to_string())
        }
        WorkspaceError::Storage(_) => ToolError::execution_failed(err.to_string()),
    }
}

fn scope_property() -> Value {
    json!({
        "type": "string",
        "enum": ["my_private", "my_shared", "team_private", "team_shared", "org_shared"],
        "description": "Which workspace visibility class to list",
    })
}

fn handle_property() -> Value {
    json!({
        "type": "string",
        "description": "Folder handle obtained from list_folders",
    })
}

fn filename_property() -> Value {
    json!({
        "type": "string",
        "description": "File name within the folder; may carry a relative subfolder prefix",
    })
}

fn agent_id_property() -> Value {
    json!({
        "type": "string",
        "description": "Your own agent id; optional, must match the executing agent if given",
    })
}

/// `list_folders` — resolve a scope into folders and fresh handles.
pub struct ListFoldersTool {
    workspace: Arc<WorkspaceService>,
}

impl ListFoldersTool {
    pub fn new(workspace: Arc<WorkspaceService>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolHandler for ListFoldersTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_folders",
            "List the folders visible in one workspace scope, with their files and a fresh \
             folder handle per folder. Handles expire; re-run this tool to refresh them.",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "scope": scope_property(),
                "agent_id": agent_id_property(),
            },
            "required": ["scope"],
        }))
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let scope: FolderScope = require_str(arguments, "scope")?
            .parse()
            .map_err(ToolError::invalid_argument)?;
        let listings = self
            .workspace
            .list_folders(scope, ctx)
            .await
            .map_err(map_workspace_error)?;

        let mut lines = Vec::new();
        if listings.is_empty() {
            lines.push(format!("No folders available in scope '{scope}'."));
        }
        for listing in &listings {
            lines.push(format!("{} (handle: {})", listing.label, listing.handle));
            if listing.files.is_empty() {
                lines.push("  (empty)".to_string());
            }
            for file in &listing.files {
                lines.push(format!(
                    "  {} ({} bytes, {}, modified {})",
                    file.name,
                    file.size,
                    file.mime_type,
                    file.modified_at.format("%Y-%m-%d %H:%M UTC"),
                ));
            }
        }

        Ok(json!({
            "content": lines.join("\n"),
            "folders": listings,
        }))
    }
}

/// `read_file` — fetch a file's content through a folder handle.
pub struct ReadFileTool {
    workspace: Arc<WorkspaceService>,
}

impl ReadFileTool {
    pub fn new(workspace: Arc<WorkspaceService>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolHandler for ReadFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("read_file", "Read a file from a workspace folder.").with_schema(
            json!({
                "type": "object",
                "properties": {
                    "handle": handle_property(),
                    "filename": filename_property(),
                    "agent_id": agent_id_property(),
                },
                "required": ["handle", "filename"],
            }),
        )
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let handle = require_str(arguments, "handle")?;
        let filename = require_str(arguments, "filename")?;
        let content = self
            .workspace
            .read_file(handle, filename, ctx)
            .await
            .map_err(map_workspace_error)?;
        Ok(json!({ "content": content }))
    }
}

/// `write_file` — create or overwrite a file through a folder handle.
pub struct WriteFileTool {
    workspace: Arc<WorkspaceService>,
}

impl WriteFileTool {
    pub fn new(workspace: Arc<WorkspaceService>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolHandler for WriteFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "write_file",
            "Write a file into a workspace folder, creating or overwriting it.",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "handle": handle_property(),
                "filename": filename_property(),
                "content": { "type": "string", "description": "Full file content to write" },
                "agent_id": agent_id_property(),
            },
            "required": ["handle", "filename", "content"],
        }))
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let handle = require_str(arguments, "handle")?;
        let filename = require_str(arguments, "filename")?;
        let content = require_str(arguments, "content")?;
        let receipt = self
            .workspace
            .write_file(handle, filename, content, ctx)
            .await
            .map_err(map_workspace_error)?;
        let verb = if receipt.created { "created" } else { "overwrote" };
        Ok(json!({
            "content": format!("{} '{}' ({} bytes)", verb, filename, receipt.bytes_written),
            "bytes_written": receipt.bytes_written,
            "created": receipt.created,
        }))
    }
}

/// `delete_file` — remove a file through a folder handle.
pub struct DeleteFileTool {
    workspace: Arc<WorkspaceService>,
}

impl DeleteFileTool {
    pub fn new(workspace: Arc<WorkspaceService>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolHandler for DeleteFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("delete_file", "Delete a file from a workspace folder.").with_schema(
            json!({
                "type": "object",
                "properties": {
                    "handle": handle_property(),
                    "filename": filename_property(),
                    "agent_id": agent_id_property(),
                },
                "required": ["handle", "filename"],
            }),
        )
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let handle = require_str(arguments, "handle")?;
        let filename = require_str(arguments, "filename")?;
        let receipt = self
            .workspace
            .delete_file(handle, filename, ctx)
            .await
            .map_err(map_workspace_error)?;
        let message = if receipt.existed {
            format!("deleted '{}'", filename)
        } else {
            format!("'{}' did not exist; nothing deleted", filename)
        };
        Ok(json!({ "content": message, "existed": receipt.existed }))
    }
}

/// `stat_file` — metadata for a single file.
pub struct StatFileTool {
    workspace: Arc<WorkspaceService>,
}

impl StatFileTool {
    pub fn new(workspace: Arc<WorkspaceService>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolHandler for StatFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "stat_file",
            "Get size, modification time, and MIME type of a file in a workspace folder.",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "handle": handle_property(),
                "filename": filename_property(),
                "agent_id": agent_id_property(),
            },
            "required": ["handle", "filename"],
        }))
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let handle = require_str(arguments, "handle")?;
        let filename = require_str(arguments, "filename")?;
        let entry = self
            .workspace
            .stat_file(handle, filename, ctx)
            .await
            .map_err(map_workspace_error)?;
        Ok(json!({
            "content": format!(
                "{}: {} bytes, {}, modified {}",
                entry.name,
                entry.size,
                entry.mime_type,
                entry.modified_at.format("%Y-%m-%d %H:%M UTC"),
            ),
            "file": entry,
        }))
    }
}
