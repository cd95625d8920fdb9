//! Tool domain types
//!
//! The canonical, provider-independent description of a tool and the
//! normalized representation of a tool invocation requested by a model.

pub mod entities;
pub mod value_objects;
