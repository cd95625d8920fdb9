//! Built-in tool handlers
//!
//! Executors for the default tool catalog: the five workspace file tools
//! plus the colleague-roster lookup. Whether a given agent may actually
//! invoke one of these is decided by the permission resolver at dispatch
//! time, not here.

mod roster;
mod workspace;

pub use roster::ListColleaguesTool;
pub use workspace::{
    DeleteFileTool, ListFoldersTool, ReadFileTool, StatFileTool, WriteFileTool,
};

use agentry_application::ports::directory::DirectoryPort;
use agentry_application::registry::{CapabilityRegistry, RegistryError};
use agentry_application::workspace::WorkspaceService;
use std::sync::Arc;

/// Register every built-in tool on a registry.
pub fn register_builtin_tools(
    registry: &CapabilityRegistry,
    workspace: Arc<WorkspaceService>,
    directory: Arc<dyn DirectoryPort>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(ListFoldersTool::new(workspace.clone())))?;
    registry.register(Arc::new(ReadFileTool::new(workspace.clone())))?;
    registry.register(Arc::new(WriteFileTool::new(workspace.clone())))?;
    registry.register(Arc::new(DeleteFileTool::new(workspace.clone())))?;
    registry.register(Arc::new(StatFileTool::new(workspace)))?;
    registry.register(Arc::new(ListColleaguesTool::new(directory)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::storage::MemoryStorage;
    use agentry_application::workspace::WorkspaceConfig;
    use agentry_domain::Organization;

    #[test]
    fn test_builtin_registration_covers_the_default_catalog() {
        let directory = Arc::new(
            InMemoryDirectory::new().with_organization(Organization::new("org-1", "Acme")),
        );
        let workspace = Arc::new(WorkspaceService::new(
            Arc::new(MemoryStorage::new()),
            directory.clone(),
            WorkspaceConfig::default(),
        ));

        let registry = CapabilityRegistry::new();
        register_builtin_tools(&registry, workspace, directory).unwrap();

        assert_eq!(
            registry.list(),
            vec![
                "delete_file",
                "list_colleagues",
                "list_folders",
                "read_file",
                "stat_file",
                "write_file",
            ]
        );
    }
}
