//! Application layer for agentry
//!
//! This crate contains the use cases and the ports they depend on.
//! Implementations of the ports (adapters) live in the infrastructure
//! layer; the domain layer stays free of I/O concerns.
//!
//! The two long-lived services here — the [`CapabilityRegistry`] and the
//! [`WorkspaceService`] — are explicitly constructed and injected into the
//! task loop rather than reached through globals, so tests get per-instance
//! isolation.

pub mod ports;
pub mod registry;
pub mod use_cases;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use ports::{
    chat_backend::{BackendError, BackendResponse, ChatBackendPort, ChatOptions, ChatRequest},
    directory::{DirectoryError, DirectoryPort},
    storage::{StorageEntry, StorageError, StoragePort},
    tool_handler::ToolHandler,
};
pub use registry::{CapabilityRegistry, RegistryError};
pub use use_cases::process_task::{
    DEFAULT_MAX_ITERATIONS, ProcessTaskError, ProcessTaskInput, ProcessTaskUseCase, TaskLoopConfig,
    TaskOutcome, TaskStatus,
};
pub use workspace::{DEFAULT_HANDLE_TTL, WorkspaceConfig, WorkspaceService};
