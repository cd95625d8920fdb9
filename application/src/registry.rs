//! Capability registry
//!
//! Maps tool names to executable handlers — the single source of truth for
//! "what tools exist". The registry knows nothing about organizations,
//! teams, or permissions; that resolution happens in the domain layer
//! before dispatch.
//!
//! Registration is a rare administrative operation; the interior lock
//! synchronizes it against the many concurrent lookups of running task
//! loops.

use crate::ports::tool_handler::ToolHandler;
use agentry_domain::ToolDefinition;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

/// Errors raised on registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool name must not be empty")]
    EmptyName,

    #[error("tool '{name}' is already registered")]
    Conflict { name: String },
}

/// In-memory registry of tool handlers.
#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn ToolHandler>>>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its definition name.
    ///
    /// Fails on an empty name or a name conflict — later registrations
    /// never silently overwrite earlier ones.
    pub fn register(&self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.definition().name;
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let mut handlers = self.handlers.write().expect("registry lock poisoned");
        if handlers.contains_key(&name) {
            return Err(RegistryError::Conflict { name });
        }
        debug!(tool = %name, "registered tool handler");
        handlers.insert(name, handler);
        Ok(())
    }

    /// Register or overwrite a handler.
    ///
    /// Deliberate overwrite path for re-seeding built-ins and for swapping
    /// in test doubles.
    pub fn replace(&self, handler: Arc<dyn ToolHandler>) {
        let name = handler.definition().name;
        debug!(tool = %name, "replaced tool handler");
        self.handlers
            .write()
            .expect("registry lock poisoned")
            .insert(name, handler);
    }

    /// Fetch a handler by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Remove a handler; a no-op if the name is absent.
    pub fn unregister(&self, name: &str) {
        self.handlers
            .write()
            .expect("registry lock poisoned")
            .remove(name);
    }

    /// Sorted names of all registered tools.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Canonical definitions of all registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .handlers
            .read()
            .expect("registry lock poisoned")
            .values()
            .map(|h| h.definition())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }
}
