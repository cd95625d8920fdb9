//! Directory domain types
//!
//! Organization, team, and agent records. Loaded as read-only snapshots at
//! the start of a task; never mutated mid-task.

pub mod entities;
