//! Client side of the process orchestration engine.
//!
//! The engine owns process definitions and correlation state; workers only
//! see activated jobs and answer each with one command: complete, throw a
//! business error, or fail with a retry budget. Workers also publish
//! correlated messages to wake waiting process branches.
//!
//! [`InMemoryEngine`] implements the same interface without a network and
//! models activation timeouts, redelivery and process cancellation.

pub mod client;
pub mod error;
pub mod job;
pub mod memory;

pub use client::EngineClient;
pub use error::{EngineError, Result};
pub use job::{ActivateJobsRequest, ActivatedJob, PublishMessage};
pub use memory::{InMemoryEngine, JobState, PublishedMessage};
