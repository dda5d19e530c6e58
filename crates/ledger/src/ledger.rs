//! Credit ledger trait and deduction arithmetic.

use async_trait::async_trait;
use common::JobKey;
use serde::{Deserialize, Serialize};

use crate::customer::CustomerId;
use crate::error::{LedgerError, Result};
use crate::money::Money;

/// Outcome of deducting an order total from a customer's credit.
///
/// `deducted + open == order_total` and `deducted <= available credit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// Part of the order total covered by credit.
    pub deducted: Money,
    /// Part of the order total that still has to be paid otherwise.
    pub open: Money,
    /// Customer credit as it stood right after this deduction. Replaying
    /// the deduction reports the same value even if later deductions have
    /// lowered the balance since.
    pub remaining_credit: Money,
}

impl DeductionResult {
    /// Splits `order_total` into the part covered by `credit` and the remainder.
    pub fn compute(credit: Money, order_total: Money) -> Result<Self> {
        if order_total.is_negative() {
            return Err(LedgerError::NegativeAmount(order_total));
        }
        let credit = credit.max(Money::zero());
        let deducted = credit.min(order_total);
        Ok(Self {
            deducted,
            open: order_total - deducted,
            remaining_credit: credit - deducted,
        })
    }

    /// The order total this result was computed for.
    pub fn order_total(&self) -> Money {
        self.deducted + self.open
    }

    /// Returns a copy reporting `credit` as the remaining credit.
    ///
    /// For ledgers whose deductions do not lower the stored credit.
    pub fn with_remaining_credit(self, credit: Money) -> Self {
        Self {
            remaining_credit: credit,
            ..self
        }
    }

    /// Returns true if credit covered the whole order.
    pub fn is_fully_covered(&self) -> bool {
        self.open.is_zero()
    }
}

/// Trait for customer credit ledgers.
///
/// `reference` identifies the deduction (the job key of the requesting job)
/// so that stateful ledgers can recognise a redelivered request.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Returns the customer's currently available credit.
    async fn customer_credit(&self, customer_id: &CustomerId) -> Result<Money>;

    /// Deducts as much of `order_total` as the customer's credit covers.
    async fn deduct_credit(
        &self,
        customer_id: &CustomerId,
        order_total: Money,
        reference: JobKey,
    ) -> Result<DeductionResult>;
}
