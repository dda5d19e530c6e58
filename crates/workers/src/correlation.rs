//! How the payment-invocation handler picks its message correlation key.

use std::str::FromStr;

use engine_client::ActivatedJob;

use crate::error::WorkerError;

/// Source of the correlation key for an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorrelationStrategy {
    /// Empty key: the message is not tied to one waiting instance.
    #[default]
    Empty,
    /// The owning process instance key.
    ProcessInstance,
    /// The value of a string job variable, which must be non-empty.
    Variable(String),
}

impl CorrelationStrategy {
    /// Resolves the key for `job`.
    pub fn resolve(&self, job: &ActivatedJob) -> Result<String, WorkerError> {
        match self {
            CorrelationStrategy::Empty => Ok(String::new()),
            CorrelationStrategy::ProcessInstance => Ok(job.process_instance_key.to_string()),
            CorrelationStrategy::Variable(name) => {
                let value = job.variables.string(name)?;
                if value.trim().is_empty() {
                    return Err(WorkerError::InvalidInput(format!(
                        "correlation variable '{name}' must not be empty"
                    )));
                }
                Ok(value.to_string())
            }
        }
    }
}

/// Error returned when parsing a [`CorrelationStrategy`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown correlation strategy '{0}', expected 'empty', 'process-instance' or 'variable:<name>'")]
pub struct ParseCorrelationError(String);

impl FromStr for CorrelationStrategy {
    type Err = ParseCorrelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "empty" => Ok(CorrelationStrategy::Empty),
            "process-instance" => Ok(CorrelationStrategy::ProcessInstance),
            other => match other.strip_prefix("variable:") {
                Some(name) if !name.is_empty() => Ok(CorrelationStrategy::Variable(name.to_string())),
                _ => Err(ParseCorrelationError(s.to_string())),
            },
        }
    }
}

impl std::fmt::Display for CorrelationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationStrategy::Empty => write!(f, "empty"),
            CorrelationStrategy::ProcessInstance => write!(f, "process-instance"),
            CorrelationStrategy::Variable(name) => write!(f, "variable:{name}"),
        }
    }
}
