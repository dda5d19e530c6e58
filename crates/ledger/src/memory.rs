//! In-memory ledger that keeps balances between deductions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::JobKey;
use tokio::sync::RwLock;

use crate::customer::CustomerId;
use crate::error::{LedgerError, Result};
use crate::ledger::{CreditLedger, DeductionResult};
use crate::money::Money;

#[derive(Debug, Clone)]
struct RecordedDeduction {
    customer_id: CustomerId,
    order_total: Money,
    result: DeductionResult,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<CustomerId, Money>,
    deductions: HashMap<JobKey, RecordedDeduction>,
}

/// Credit ledger that stores balances in memory.
///
/// A customer without an explicit balance starts at their derived credit.
/// Each deduction lowers the balance and is recorded under its reference;
/// repeating a reference returns the recorded result and leaves the
/// balance alone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCreditLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryCreditLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a customer's balance. Negative balances are rejected.
    pub async fn set_balance(&self, customer_id: CustomerId, balance: Money) -> Result<()> {
        if balance.is_negative() {
            return Err(LedgerError::NegativeAmount(balance));
        }
        self.state.write().await.balances.insert(customer_id, balance);
        Ok(())
    }

    /// Returns the number of distinct deductions applied.
    pub async fn deduction_count(&self) -> usize {
        self.state.read().await.deductions.len()
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn customer_credit(&self, customer_id: &CustomerId) -> Result<Money> {
        let state = self.state.read().await;
        Ok(state
            .balances
            .get(customer_id)
            .copied()
            .unwrap_or_else(|| customer_id.derived_credit()))
    }

    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    async fn deduct_credit(
        &self,
        customer_id: &CustomerId,
        order_total: Money,
        reference: JobKey,
    ) -> Result<DeductionResult> {
        let mut state = self.state.write().await;

        if let Some(recorded) = state.deductions.get(&reference) {
            if recorded.customer_id != *customer_id || recorded.order_total != order_total {
                return Err(LedgerError::ReferenceReused(reference));
            }
            tracing::info!(%reference, "deduction already applied, returning recorded result");
            return Ok(recorded.result);
        }

        let credit = state
            .balances
            .get(customer_id)
            .copied()
            .unwrap_or_else(|| customer_id.derived_credit());
        let result = DeductionResult::compute(credit, order_total)?;

        state
            .balances
            .insert(customer_id.clone(), result.remaining_credit);
        state.deductions.insert(
            reference,
            RecordedDeduction {
                customer_id: customer_id.clone(),
                order_total,
                result,
            },
        );

        metrics::counter!("ledger_deductions_total").increment(1);
        tracing::info!(
            %credit,
            deducted = %result.deducted,
            open = %result.open,
            "credit deducted"
        );
        Ok(result)
    }
}
