//! Ports (interfaces) for external dependencies
//!
//! Each port defines how the application layer talks to one collaborator.
//! Adapters implementing them live in the infrastructure layer.

pub mod chat_backend;
pub mod directory;
pub mod storage;
pub mod tool_handler;
