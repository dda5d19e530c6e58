//! `payment-completion`: signals the waiting order instance that payment is done.

use async_trait::async_trait;
use common::Variables;
use engine_client::{ActivatedJob, EngineClient, PublishMessage};

use crate::error::{Result, WorkerError};
use crate::handler::JobHandler;
use crate::job_types;
use crate::outcome::Outcome;

/// Publishes `paymentCompletedMessage` correlated on the `orderId` variable.
pub struct PaymentCompletionHandler<E: EngineClient> {
    engine: E,
}

impl<E: EngineClient> PaymentCompletionHandler<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    async fn handle(&self, job: &ActivatedJob) -> Result<Variables> {
        let order_id = job.variables.string("orderId")?;
        if order_id.trim().is_empty() {
            return Err(WorkerError::InvalidInput(
                "orderId must not be empty".to_string(),
            ));
        }

        self.engine
            .publish_message(PublishMessage::new(
                job_types::PAYMENT_COMPLETED_MESSAGE,
                order_id,
                job.variables.clone(),
            ))
            .await?;
        tracing::info!(%order_id, "payment completion published");
        Ok(Variables::new())
    }
}

#[async_trait]
impl<E: EngineClient> JobHandler for PaymentCompletionHandler<E> {
    fn job_type(&self) -> &'static str {
        job_types::PAYMENT_COMPLETION
    }

    async fn execute(&self, job: &ActivatedJob) -> Outcome {
        Outcome::from_result(self.handle(job).await, job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{JobKey, ProcessInstanceKey};
    use engine_client::InMemoryEngine;

    fn job(variables: Variables) -> ActivatedJob {
        ActivatedJob::new(
            JobKey::new(3),
            job_types::PAYMENT_COMPLETION,
            ProcessInstanceKey::new(9),
            variables,
        )
    }

    #[tokio::test]
    async fn test_publishes_on_order_id() {
        let engine = InMemoryEngine::new();
        let handler = PaymentCompletionHandler::new(engine.clone());
        let variables = Variables::new()
            .with("orderId", "order-1")
            .with("openAmount", 20.0);

        let outcome = handler.execute(&job(variables.clone())).await;
        assert_eq!(outcome, Outcome::completed(Variables::new()));

        let messages = engine.published_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, job_types::PAYMENT_COMPLETED_MESSAGE);
        assert_eq!(messages[0].correlation_key, "order-1");
        assert_eq!(messages[0].variables, variables);
    }

    #[tokio::test]
    async fn test_missing_or_empty_order_id_is_invalid_input() {
        let engine = InMemoryEngine::new();
        let handler = PaymentCompletionHandler::new(engine.clone());

        for variables in [
            Variables::new(),
            Variables::new().with("orderId", ""),
            Variables::new().with("orderId", 17),
        ] {
            let outcome = handler.execute(&job(variables)).await;
            assert!(
                matches!(&outcome, Outcome::BusinessError { code, .. } if code == job_types::INVALID_INPUT_ERROR),
                "got {outcome:?}"
            );
        }
        assert!(engine.published_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_unreachable_is_technical_failure() {
        let engine = InMemoryEngine::new();
        engine.set_unavailable(true).await;
        let handler = PaymentCompletionHandler::new(engine);

        let outcome = handler
            .execute(&job(Variables::new().with("orderId", "order-1")).with_retries(1))
            .await;
        assert!(matches!(outcome, Outcome::TechnicalFailure { retries: 0, .. }));
    }
}
