//! Workspace domain types
//!
//! Folder scopes, the scope permission matrix, and listing value objects.
//! The access *service* (handle cache, storage calls) lives in the
//! application layer; this module holds the pure rules it enforces.

pub mod entities;
pub mod error;
pub mod scope;
