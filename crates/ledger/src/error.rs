//! Ledger error types.

use common::JobKey;
use thiserror::Error;

use crate::money::Money;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The customer identifier cannot yield a credit value.
    #[error("Invalid customer id '{customer_id}': {reason}")]
    InvalidCustomerId {
        customer_id: String,
        reason: &'static str,
    },

    /// Deductions must be for a non-negative amount.
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(Money),

    /// A deduction reference was reused for a different customer or amount.
    #[error("Deduction reference {0} was already used for a different deduction")]
    ReferenceReused(JobKey),
}

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
