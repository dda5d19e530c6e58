//! Engine client error types.

use common::JobKey;
use thiserror::Error;

/// Errors returned by the orchestration engine or the transport to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The job no longer exists: it was completed, failed, or its process
    /// instance was cancelled.
    #[error("Job not found: {0}")]
    JobNotFound(JobKey),

    /// The engine could not be reached.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// The engine refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl EngineError {
    /// Returns true if the error only means the job is gone.
    pub fn is_job_not_found(&self) -> bool {
        matches!(self, EngineError::JobNotFound(_))
    }
}

/// Convenience type alias for engine client results.
pub type Result<T> = std::result::Result<T, EngineError>;
