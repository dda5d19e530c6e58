//! In-memory engine for tests and the local sandbox.
//!
//! Jobs move through activatable, activated and terminal states. An
//! activation that outlives its deadline makes the job activatable again,
//! which is how redelivery shows up to workers. Commands on terminal,
//! cancelled or unknown jobs fail with [`EngineError::JobNotFound`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{JobKey, ProcessInstanceKey, Variables};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::client::EngineClient;
use crate::error::{EngineError, Result};
use crate::job::{ActivateJobsRequest, ActivatedJob, PublishMessage};

/// Lifecycle state of a job held by [`InMemoryEngine`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    /// Waiting to be activated.
    Activatable {
        retries: u32,
        last_error: Option<String>,
    },
    /// Handed to a worker until `deadline`.
    Activated {
        worker: String,
        retries: u32,
        deadline: DateTime<Utc>,
    },
    /// Completed with the given variables.
    Completed { variables: Variables },
    /// A business error was thrown.
    ErrorThrown { code: String, message: String },
    /// Failed with no retries left.
    Incident { message: String },
}

impl JobState {
    /// Returns true if the job no longer accepts commands.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed { .. } | JobState::ErrorThrown { .. } | JobState::Incident { .. }
        )
    }
}

/// A message recorded by [`InMemoryEngine::publish_message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedMessage {
    pub name: String,
    pub correlation_key: String,
    pub variables: Variables,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug)]
struct JobRecord {
    job_type: String,
    process_instance_key: ProcessInstanceKey,
    variables: Variables,
    state: JobState,
}

#[derive(Debug, Default)]
struct EngineState {
    jobs: BTreeMap<JobKey, JobRecord>,
    messages: Vec<PublishedMessage>,
    next_key: i64,
    unavailable: bool,
    fail_on_publish: bool,
}

/// In-memory orchestration engine for testing and local runs.
///
/// Jobs are activated in creation order. An activation that is not answered
/// before its deadline makes the job activatable again, which is how the
/// engine redelivers work.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEngine {
    state: Arc<RwLock<EngineState>>,
}

impl InMemoryEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an activatable job and returns its key.
    pub async fn create_job(
        &self,
        job_type: impl Into<String>,
        process_instance_key: ProcessInstanceKey,
        retries: u32,
        variables: Variables,
    ) -> JobKey {
        let mut state = self.state.write().await;
        state.next_key += 1;
        let key = JobKey::new(state.next_key);
        state.jobs.insert(
            key,
            JobRecord {
                job_type: job_type.into(),
                process_instance_key,
                variables,
                state: JobState::Activatable {
                    retries,
                    last_error: None,
                },
            },
        );
        key
    }

    /// Removes every job of a process instance. Returns how many were removed.
    pub async fn cancel_process_instance(&self, process_instance_key: ProcessInstanceKey) -> usize {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state
            .jobs
            .retain(|_, job| job.process_instance_key != process_instance_key);
        let removed = before - state.jobs.len();
        tracing::info!(%process_instance_key, removed, "process instance cancelled");
        removed
    }

    /// Returns the state of a job, if it exists.
    pub async fn job_state(&self, key: JobKey) -> Option<JobState> {
        self.state
            .read()
            .await
            .jobs
            .get(&key)
            .map(|job| job.state.clone())
    }

    /// Returns all messages published so far, oldest first.
    pub async fn published_messages(&self) -> Vec<PublishedMessage> {
        self.state.read().await.messages.clone()
    }

    /// Returns the number of jobs that are activatable or activated.
    pub async fn pending_count(&self) -> usize {
        self.state
            .read()
            .await
            .jobs
            .values()
            .filter(|job| !job.state.is_terminal())
            .count()
    }

    /// Makes every call fail with [`EngineError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Makes message publication fail while other commands keep working.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }
}

impl EngineState {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(EngineError::Unavailable(
                "connection to engine refused".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the job if it still accepts commands.
    fn open_job(&mut self, key: JobKey) -> Result<&mut JobRecord> {
        match self.jobs.get_mut(&key) {
            Some(job) if !job.state.is_terminal() => Ok(job),
            _ => Err(EngineError::JobNotFound(key)),
        }
    }
}

fn remaining_retries(state: &JobState) -> u32 {
    match state {
        JobState::Activatable { retries, .. } | JobState::Activated { retries, .. } => *retries,
        _ => 0,
    }
}

#[async_trait]
impl EngineClient for InMemoryEngine {
    async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<Vec<ActivatedJob>> {
        let mut state = self.state.write().await;
        state.check_available()?;

        let now = Utc::now();
        let timeout = chrono::Duration::from_std(request.timeout)
            .map_err(|e| EngineError::Rejected(format!("invalid timeout: {e}")))?;
        let deadline = now + timeout;

        let mut activated = Vec::new();
        for (key, job) in state.jobs.iter_mut() {
            if activated.len() >= request.max_jobs {
                break;
            }
            if job.job_type != request.job_type {
                continue;
            }
            let retries = match &job.state {
                JobState::Activatable { retries, .. } => *retries,
                JobState::Activated {
                    retries,
                    deadline: lapsed,
                    ..
                } if *lapsed <= now => *retries,
                _ => continue,
            };

            job.state = JobState::Activated {
                worker: request.worker.clone(),
                retries,
                deadline,
            };
            activated.push(ActivatedJob {
                key: *key,
                job_type: job.job_type.clone(),
                process_instance_key: job.process_instance_key,
                retries,
                worker: request.worker.clone(),
                deadline,
                variables: job.variables.clone(),
            });
        }

        if !activated.is_empty() {
            tracing::debug!(
                job_type = %request.job_type,
                count = activated.len(),
                "jobs activated"
            );
        }
        Ok(activated)
    }

    async fn complete_job(&self, key: JobKey, variables: Variables) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let job = state.open_job(key)?;
        job.state = JobState::Completed { variables };
        Ok(())
    }

    async fn throw_error(&self, key: JobKey, code: &str, message: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        if code.is_empty() {
            return Err(EngineError::Rejected("error code must not be empty".to_string()));
        }
        let job = state.open_job(key)?;
        job.state = JobState::ErrorThrown {
            code: code.to_string(),
            message: message.to_string(),
        };
        Ok(())
    }

    async fn fail_job(&self, key: JobKey, retries: u32, message: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let job = state.open_job(key)?;
        tracing::debug!(
            %key,
            previous_retries = remaining_retries(&job.state),
            retries,
            "job failed"
        );
        job.state = if retries == 0 {
            JobState::Incident {
                message: message.to_string(),
            }
        } else {
            JobState::Activatable {
                retries,
                last_error: Some(message.to_string()),
            }
        };
        Ok(())
    }

    async fn publish_message(&self, message: PublishMessage) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        if state.fail_on_publish {
            return Err(EngineError::Unavailable(
                "message publication timed out".to_string(),
            ));
        }
        if message.name.is_empty() {
            return Err(EngineError::Rejected(
                "message name must not be empty".to_string(),
            ));
        }
        state.messages.push(PublishedMessage {
            name: message.name,
            correlation_key: message.correlation_key,
            variables: message.variables,
            published_at: Utc::now(),
        });
        Ok(())
    }
}
