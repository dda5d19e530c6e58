//! HTTP route handlers.

pub mod jobs;
pub mod system;
