//! Engine client trait.

use async_trait::async_trait;
use common::{JobKey, Variables};

use crate::error::Result;
use crate::job::{ActivateJobsRequest, ActivatedJob, PublishMessage};

/// Commands a worker can send to the orchestration engine.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Activates up to `request.max_jobs` jobs of one type.
    async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<Vec<ActivatedJob>>;

    /// Completes a job, merging `variables` into the process instance.
    async fn complete_job(&self, key: JobKey, variables: Variables) -> Result<()>;

    /// Throws a business error that the process routes through a matching
    /// error boundary.
    async fn throw_error(&self, key: JobKey, code: &str, message: &str) -> Result<()>;

    /// Fails a job. With `retries == 0` the engine raises an incident
    /// instead of redelivering.
    async fn fail_job(&self, key: JobKey, retries: u32, message: &str) -> Result<()>;

    /// Publishes a message correlated by name and correlation key.
    async fn publish_message(&self, message: PublishMessage) -> Result<()>;
}
