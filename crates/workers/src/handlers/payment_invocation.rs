//! `payment-invocation`: forwards the job's variables as a payment request.

use async_trait::async_trait;
use common::Variables;
use engine_client::{ActivatedJob, EngineClient, PublishMessage};

use crate::correlation::CorrelationStrategy;
use crate::error::Result;
use crate::handler::JobHandler;
use crate::job_types;
use crate::outcome::Outcome;

/// Publishes `paymentRequestMessage` with the job's variables unchanged,
/// then completes the job without setting variables.
pub struct PaymentInvocationHandler<E: EngineClient> {
    engine: E,
    correlation: CorrelationStrategy,
}

impl<E: EngineClient> PaymentInvocationHandler<E> {
    /// Creates a handler that publishes through `engine`.
    pub fn new(engine: E, correlation: CorrelationStrategy) -> Self {
        Self {
            engine,
            correlation,
        }
    }

    async fn handle(&self, job: &ActivatedJob) -> Result<Variables> {
        let correlation_key = self.correlation.resolve(job)?;
        self.engine
            .publish_message(PublishMessage::new(
                job_types::PAYMENT_REQUEST_MESSAGE,
                correlation_key.clone(),
                job.variables.clone(),
            ))
            .await?;
        tracing::info!(%correlation_key, "payment request published");
        Ok(Variables::new())
    }
}

#[async_trait]
impl<E: EngineClient> JobHandler for PaymentInvocationHandler<E> {
    fn job_type(&self) -> &'static str {
        job_types::PAYMENT_INVOCATION
    }

    async fn execute(&self, job: &ActivatedJob) -> Outcome {
        Outcome::from_result(self.handle(job).await, job)
    }
}
