//! Runtime configuration.

use std::time::Duration;

/// Settings for [`JobWorkerRuntime`](crate::JobWorkerRuntime).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name reported to the engine when activating jobs.
    pub worker_name: String,
    /// Maximum number of jobs of one job type activated per poll.
    pub max_jobs_active: usize,
    /// How long an activated job is reserved for this worker.
    pub job_timeout: Duration,
    /// Pause between polls.
    pub poll_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_name: "saga-worker".to_string(),
            max_jobs_active: 32,
            job_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(100),
        }
    }
}
