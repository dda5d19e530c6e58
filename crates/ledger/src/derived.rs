//! Stateless ledger that derives credit from the customer identifier.

use async_trait::async_trait;
use common::JobKey;

use crate::customer::CustomerId;
use crate::error::Result;
use crate::ledger::{CreditLedger, DeductionResult};
use crate::money::Money;

/// Credit ledger without storage.
///
/// Credit is read off the customer identifier and deductions do not change
/// it, so repeating a deduction always yields the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedCreditLedger;

impl DerivedCreditLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CreditLedger for DerivedCreditLedger {
    async fn customer_credit(&self, customer_id: &CustomerId) -> Result<Money> {
        Ok(customer_id.derived_credit())
    }

    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    async fn deduct_credit(
        &self,
        customer_id: &CustomerId,
        order_total: Money,
        reference: JobKey,
    ) -> Result<DeductionResult> {
        let credit = self.customer_credit(customer_id).await?;
        tracing::info!(%credit, "customer credit looked up");

        let result = DeductionResult::compute(credit, order_total)?.with_remaining_credit(credit);
        metrics::counter!("ledger_deductions_total").increment(1);
        tracing::info!(
            deducted = %result.deducted,
            open = %result.open,
            "credit deducted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_credit_is_derived() {
        let ledger = DerivedCreditLedger::new();
        let id = CustomerId::parse("cust-50").unwrap();
        assert_eq!(
            ledger.customer_credit(&id).await.unwrap(),
            Money::from_units(50)
        );
    }

    #[tokio::test]
    async fn test_deduction_leaves_credit_untouched() {
        let ledger = DerivedCreditLedger::new();
        let id = CustomerId::parse("cust-50").unwrap();

        let first = ledger
            .deduct_credit(&id, Money::from_units(70), JobKey::new(1))
            .await
            .unwrap();
        let second = ledger
            .deduct_credit(&id, Money::from_units(70), JobKey::new(1))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.open, Money::from_units(20));
        assert_eq!(first.remaining_credit, Money::from_units(50));
        assert_eq!(
            ledger.customer_credit(&id).await.unwrap(),
            Money::from_units(50)
        );
    }
}
