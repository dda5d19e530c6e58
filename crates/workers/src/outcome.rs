//! Handler outcomes and the engine commands they translate to.

use common::{JobKey, Variables};
use engine_client::{ActivatedJob, EngineClient};
use serde::Serialize;

use crate::error::WorkerError;

/// What a handler reports back for a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The step succeeded. `variables` is merged into the process instance.
    Completed { variables: Variables },

    /// A recoverable error routed through the error boundary named `code`.
    BusinessError { code: String, message: String },

    /// An unexpected failure. `retries == 0` makes it terminal.
    TechnicalFailure { retries: u32, message: String },
}

impl Outcome {
    pub fn completed(variables: Variables) -> Self {
        Outcome::Completed { variables }
    }

    pub fn business_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::BusinessError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn technical_failure(retries: u32, message: impl Into<String>) -> Self {
        Outcome::TechnicalFailure {
            retries,
            message: message.into(),
        }
    }

    /// Resolves a handler result, classifying any error.
    pub fn from_result(result: Result<Variables, WorkerError>, job: &ActivatedJob) -> Self {
        match result {
            Ok(variables) => Outcome::completed(variables),
            Err(err) => err.classify(job),
        }
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed { .. } => "completed",
            Outcome::BusinessError { .. } => "business_error",
            Outcome::TechnicalFailure { .. } => "technical_failure",
        }
    }

    /// Translates the outcome into the command answering job `key`.
    pub fn into_command(self, key: JobKey) -> JobCommand {
        match self {
            Outcome::Completed { variables } => JobCommand::Complete { key, variables },
            Outcome::BusinessError { code, message } => JobCommand::ThrowError { key, code, message },
            Outcome::TechnicalFailure { retries, message } => JobCommand::Fail {
                key,
                retries,
                message,
            },
        }
    }
}

/// A command that answers a job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobCommand {
    Complete {
        key: JobKey,
        variables: Variables,
    },
    ThrowError {
        key: JobKey,
        code: String,
        message: String,
    },
    Fail {
        key: JobKey,
        retries: u32,
        message: String,
    },
}

impl JobCommand {
    /// Sends the command to the engine.
    pub async fn send<E: EngineClient + ?Sized>(self, engine: &E) -> engine_client::Result<()> {
        match self {
            JobCommand::Complete { key, variables } => engine.complete_job(key, variables).await,
            JobCommand::ThrowError { key, code, message } => {
                engine.throw_error(key, &code, &message).await
            }
            JobCommand::Fail {
                key,
                retries,
                message,
            } => engine.fail_job(key, retries, &message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProcessInstanceKey;
    use engine_client::{ActivateJobsRequest, InMemoryEngine, JobState};
    use std::time::Duration;

    #[test]
    fn test_into_command() {
        let key = JobKey::new(9);
        assert_eq!(
            Outcome::business_error("invalidInput", "bad").into_command(key),
            JobCommand::ThrowError {
                key,
                code: "invalidInput".to_string(),
                message: "bad".to_string(),
            }
        );
        assert_eq!(
            Outcome::technical_failure(0, "expired").into_command(key),
            JobCommand::Fail {
                key,
                retries: 0,
                message: "expired".to_string(),
            }
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Outcome::completed(Variables::new()).label(), "completed");
        assert_eq!(Outcome::business_error("c", "m").label(), "business_error");
        assert_eq!(Outcome::technical_failure(1, "m").label(), "technical_failure");
    }

    #[tokio::test]
    async fn test_send_commands() {
        let engine = InMemoryEngine::new();
        let pik = ProcessInstanceKey::new(1);
        let a = engine.create_job("t", pik, 3, Variables::new()).await;
        let b = engine.create_job("t", pik, 3, Variables::new()).await;
        engine
            .activate_jobs(ActivateJobsRequest::new("t", "w", 10, Duration::from_secs(60)))
            .await
            .unwrap();

        let vars = Variables::new().with("discountedAmount", 80.0);
        Outcome::completed(vars.clone())
            .into_command(a)
            .send(&engine)
            .await
            .unwrap();
        Outcome::technical_failure(0, "boom")
            .into_command(b)
            .send(&engine)
            .await
            .unwrap();

        assert_eq!(
            engine.job_state(a).await,
            Some(JobState::Completed { variables: vars })
        );
        assert_eq!(
            engine.job_state(b).await,
            Some(JobState::Incident {
                message: "boom".to_string()
            })
        );
    }
}
