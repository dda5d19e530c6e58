//! Job handler trait.

use async_trait::async_trait;
use engine_client::ActivatedJob;

use crate::outcome::Outcome;

/// Processes the jobs of one job type.
///
/// `execute` never fails: every error is classified into an [`Outcome`]
/// before it leaves the handler. Handlers must tolerate the same job being
/// delivered more than once.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler subscribes to.
    fn job_type(&self) -> &'static str;

    /// Runs the step for `job`.
    async fn execute(&self, job: &ActivatedJob) -> Outcome;
}
