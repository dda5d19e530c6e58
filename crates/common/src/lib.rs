//! Shared types for the saga participant workers.

pub mod types;
pub mod variables;

pub use types::{JobKey, ProcessInstanceKey};
pub use variables::{VariableError, Variables};
