//! Worker error types and their classification into outcomes.

use common::VariableError;
use engine_client::{ActivatedJob, EngineError};
use ledger::LedgerError;
use thiserror::Error;

use crate::job_types;
use crate::outcome::Outcome;
use crate::services::GatewayError;

/// Errors that can occur while a handler processes a job.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A job variable is missing, has the wrong type, or is out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The customer id cannot yield a credit value.
    #[error("{0}")]
    InvalidCustomerId(LedgerError),

    /// The payment gateway rejected the card data.
    #[error("Card rejected: {0}")]
    CardRejected(String),

    /// The payment gateway failed for a reason other than invalid input.
    #[error("Payment failed: {0}")]
    PaymentFailed(GatewayError),

    /// The ledger failed unexpectedly.
    #[error("Ledger error: {0}")]
    Ledger(LedgerError),

    /// Communication with the engine failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl WorkerError {
    /// Maps the error onto exactly one of the engine's completion semantics.
    ///
    /// Input problems become business errors the process can route.
    /// Unexpected gateway and ledger failures are terminal (no retries).
    /// Engine communication errors keep the job's retry budget minus one but
    /// always leave at least one retry, so a transient outage alone never
    /// raises an incident.
    pub fn classify(self, job: &ActivatedJob) -> Outcome {
        let message = self.to_string();
        match self {
            WorkerError::InvalidInput(_) => {
                Outcome::business_error(job_types::INVALID_INPUT_ERROR, message)
            }
            WorkerError::InvalidCustomerId(_) => {
                Outcome::business_error(job_types::INVALID_CUSTOMER_ID_ERROR, message)
            }
            WorkerError::CardRejected(_) => {
                Outcome::business_error(job_types::CREDIT_CARD_CHARGE_ERROR, message)
            }
            WorkerError::PaymentFailed(_) | WorkerError::Ledger(_) => {
                Outcome::technical_failure(0, message)
            }
            WorkerError::Engine(_) => {
                Outcome::technical_failure(job.retries.saturating_sub(1).max(1), message)
            }
        }
    }
}

impl From<VariableError> for WorkerError {
    fn from(err: VariableError) -> Self {
        WorkerError::InvalidInput(err.to_string())
    }
}

impl From<LedgerError> for WorkerError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidCustomerId { .. } => WorkerError::InvalidCustomerId(err),
            LedgerError::NegativeAmount(_) => WorkerError::InvalidInput(err.to_string()),
            LedgerError::ReferenceReused(_) => WorkerError::Ledger(err),
        }
    }
}

impl From<GatewayError> for WorkerError {
    fn from(err: GatewayError) -> Self {
        if err.is_invalid_input() {
            WorkerError::CardRejected(err.to_string())
        } else {
            WorkerError::PaymentFailed(err)
        }
    }
}

/// Convenience type alias for handler results.
pub type Result<T> = std::result::Result<T, WorkerError>;
