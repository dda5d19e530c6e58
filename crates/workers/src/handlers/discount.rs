//! `apply-discount`: applies a percentage discount to the order total.

use async_trait::async_trait;
use common::Variables;
use engine_client::ActivatedJob;

use crate::error::{Result, WorkerError};
use crate::handler::JobHandler;
use crate::job_types;
use crate::outcome::Outcome;

/// Validated input of an `apply-discount` job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountInput {
    /// Percentage, 0 to 100 inclusive.
    pub discount: i64,
    pub order_total: f64,
}

impl DiscountInput {
    /// `order_total * (100 - discount) / 100`.
    pub fn discounted_amount(&self) -> f64 {
        self.order_total * (100 - self.discount) as f64 / 100.0
    }
}

impl TryFrom<&Variables> for DiscountInput {
    type Error = WorkerError;

    fn try_from(variables: &Variables) -> Result<Self> {
        let discount = variables.integer("discount")?;
        if !(0..=100).contains(&discount) {
            return Err(WorkerError::InvalidInput(format!(
                "discount must be between 0 and 100, got {discount}"
            )));
        }
        let order_total = variables.float("orderTotal")?;
        if !order_total.is_finite() || order_total < 0.0 {
            return Err(WorkerError::InvalidInput(format!(
                "orderTotal must be a non-negative amount, got {order_total}"
            )));
        }
        Ok(Self {
            discount,
            order_total,
        })
    }
}

/// Handles `apply-discount` jobs. Sets `discountedAmount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountHandler;

impl DiscountHandler {
    pub fn new() -> Self {
        Self
    }

    fn handle(&self, job: &ActivatedJob) -> Result<Variables> {
        let input = DiscountInput::try_from(&job.variables)?;
        let discounted = input.discounted_amount();
        tracing::info!(
            discount = input.discount,
            order_total = input.order_total,
            discounted,
            "discount applied"
        );
        Ok(Variables::new().with("discountedAmount", discounted))
    }
}

#[async_trait]
impl JobHandler for DiscountHandler {
    fn job_type(&self) -> &'static str {
        job_types::APPLY_DISCOUNT
    }

    async fn execute(&self, job: &ActivatedJob) -> Outcome {
        Outcome::from_result(self.handle(job), job)
    }
}
