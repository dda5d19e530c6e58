//! Jobs and requests exchanged with the engine.

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{JobKey, ProcessInstanceKey, Variables};
use serde::{Deserialize, Serialize};

/// Retry budget assigned to jobs that do not specify one.
pub const DEFAULT_RETRIES: u32 = 3;

/// A job handed to a worker.
///
/// The same job (same `key`) can be delivered more than once if the worker
/// does not answer before `deadline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivatedJob {
    pub key: JobKey,
    /// Job type; selects the handler.
    pub job_type: String,
    /// Saga instance that owns the job.
    pub process_instance_key: ProcessInstanceKey,
    /// Remaining retries before the engine raises an incident.
    pub retries: u32,
    /// Name of the worker the job was activated for.
    pub worker: String,
    /// When the activation lapses and the job becomes activatable again.
    pub deadline: DateTime<Utc>,
    pub variables: Variables,
}

impl ActivatedJob {
    /// Creates a job with the default retry budget and no worker assigned.
    pub fn new(
        key: JobKey,
        job_type: impl Into<String>,
        process_instance_key: ProcessInstanceKey,
        variables: Variables,
    ) -> Self {
        Self {
            key,
            job_type: job_type.into(),
            process_instance_key,
            retries: DEFAULT_RETRIES,
            worker: String::new(),
            deadline: Utc::now(),
            variables,
        }
    }

    /// Sets the remaining retries.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Request to activate jobs of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateJobsRequest {
    pub job_type: String,
    pub worker: String,
    pub max_jobs: usize,
    /// How long the worker holds the jobs before they may be redelivered.
    pub timeout: Duration,
}

impl ActivateJobsRequest {
    pub fn new(
        job_type: impl Into<String>,
        worker: impl Into<String>,
        max_jobs: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            worker: worker.into(),
            max_jobs,
            timeout,
        }
    }
}

/// A message to correlate with waiting process instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishMessage {
    pub name: String,
    /// Routes the message to a waiting instance. Empty means the message
    /// is not tied to a particular instance.
    pub correlation_key: String,
    pub variables: Variables,
}

impl PublishMessage {
    pub fn new(
        name: impl Into<String>,
        correlation_key: impl Into<String>,
        variables: Variables,
    ) -> Self {
        Self {
            name: name.into(),
            correlation_key: correlation_key.into(),
            variables,
        }
    }
}
