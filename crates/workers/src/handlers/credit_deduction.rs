//! `credit-deduction`: covers as much of the order total as the customer's
//! credit allows.

use async_trait::async_trait;
use common::Variables;
use engine_client::ActivatedJob;
use ledger::{CreditLedger, CustomerId};

use crate::error::Result;
use crate::handler::JobHandler;
use crate::handlers::amount;
use crate::job_types;
use crate::outcome::Outcome;

/// Handles `credit-deduction` jobs. Sets `openAmount` and `customerCredit`.
///
/// Both come from the ledger's deduction result, so a redelivered job
/// reports the same values even after other deductions for the customer.
pub struct CreditDeductionHandler<L: CreditLedger> {
    ledger: L,
}

impl<L: CreditLedger> CreditDeductionHandler<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    async fn handle(&self, job: &ActivatedJob) -> Result<Variables> {
        let customer_id = CustomerId::parse(job.variables.string("customerId")?)?;
        let order_total = amount("orderTotal", job.variables.float("orderTotal")?)?;

        let deduction = self
            .ledger
            .deduct_credit(&customer_id, order_total, job.key)
            .await?;

        Ok(Variables::new()
            .with("openAmount", deduction.open.as_f64())
            .with("customerCredit", deduction.remaining_credit.as_f64()))
    }
}

#[async_trait]
impl<L: CreditLedger> JobHandler for CreditDeductionHandler<L> {
    fn job_type(&self) -> &'static str {
        job_types::CREDIT_DEDUCTION
    }

    async fn execute(&self, job: &ActivatedJob) -> Outcome {
        Outcome::from_result(self.handle(job).await, job)
    }
}
