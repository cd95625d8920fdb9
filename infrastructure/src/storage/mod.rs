//! Storage adapters for the workspace persistence port

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
