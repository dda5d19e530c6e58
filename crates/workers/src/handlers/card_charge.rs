//! `credit-card-charging`: charges the amount left open after credit
//! deduction.
//!
//! Gateway failures split three ways:
//! - card data rejected as invalid: business error `creditCardChargeError`
//! - anything else (expired card, decline, outage): technical failure with
//!   no retries, left for an operator
//! - success: completed without variables

use async_trait::async_trait;
use common::Variables;
use engine_client::ActivatedJob;
use ledger::Money;

use crate::error::{Result, WorkerError};
use crate::handler::JobHandler;
use crate::handlers::amount;
use crate::job_types;
use crate::outcome::Outcome;
use crate::services::{CardDetails, ChargeRequest, PaymentGateway};

/// Validated input of a `credit-card-charging` job.
#[derive(Debug, Clone)]
pub struct CardChargeInput {
    pub card: CardDetails,
    pub open_amount: Money,
}

impl TryFrom<&Variables> for CardChargeInput {
    type Error = WorkerError;

    /// Missing or non-string card fields count as rejected card data.
    fn try_from(variables: &Variables) -> Result<Self> {
        let card_field = |name: &str| -> Result<String> {
            variables
                .string(name)
                .map(str::to_string)
                .map_err(|e| WorkerError::CardRejected(e.to_string()))
        };
        let cvc = if variables.contains("CVC") {
            card_field("CVC")?
        } else {
            card_field("cvc")?
        };
        let card = CardDetails::new(card_field("cardNumber")?, cvc, card_field("expiryDate")?);
        let open_amount = amount("openAmount", variables.float("openAmount")?)?;
        Ok(Self { card, open_amount })
    }
}

/// Handles `credit-card-charging` jobs through a [`PaymentGateway`].
///
/// The job key is the gateway idempotency key, so a redelivered job does
/// not charge the card again.
pub struct CardChargeHandler<G: PaymentGateway> {
    gateway: G,
}

impl<G: PaymentGateway> CardChargeHandler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    async fn handle(&self, job: &ActivatedJob) -> Result<Variables> {
        let input = CardChargeInput::try_from(&job.variables)?;
        let receipt = self
            .gateway
            .charge(ChargeRequest {
                card: input.card,
                amount: input.open_amount,
                idempotency_key: job.key.to_string(),
            })
            .await?;
        tracing::info!(
            charge_id = %receipt.charge_id,
            amount = %receipt.amount,
            replayed = receipt.replayed,
            "credit card charged"
        );
        Ok(Variables::new())
    }
}

#[async_trait]
impl<G: PaymentGateway> JobHandler for CardChargeHandler<G> {
    fn job_type(&self) -> &'static str {
        job_types::CREDIT_CARD_CHARGING
    }

    async fn execute(&self, job: &ActivatedJob) -> Outcome {
        Outcome::from_result(self.handle(job).await, job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{GatewayError, InMemoryPaymentGateway};
    use chrono::NaiveDate;
    use common::{JobKey, ProcessInstanceKey};
    use serde_json::json;

    async fn handler() -> (CardChargeHandler<InMemoryPaymentGateway>, InMemoryPaymentGateway) {
        let gateway = InMemoryPaymentGateway::new();
        gateway
            .set_today(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())
            .await;
        (CardChargeHandler::new(gateway.clone()), gateway)
    }

    fn job(variables: serde_json::Value) -> ActivatedJob {
        ActivatedJob::new(
            JobKey::new(31),
            job_types::CREDIT_CARD_CHARGING,
            ProcessInstanceKey::new(1),
            Variables::try_from(variables).unwrap(),
        )
    }

    fn card_job(card_number: &str, cvc: &str, expiry: &str) -> ActivatedJob {
        job(json!({
            "cardNumber": card_number,
            "CVC": cvc,
            "expiryDate": expiry,
            "openAmount": 20.0,
        }))
    }

    fn is_card_error(outcome: &Outcome) -> bool {
        matches!(outcome, Outcome::BusinessError { code, .. } if code == job_types::CREDIT_CARD_CHARGE_ERROR)
    }

    #[tokio::test]
    async fn test_successful_charge() {
        let (handler, gateway) = handler().await;
        let outcome = handler
            .execute(&card_job("4111111111111111", "123", "12/28"))
            .await;
        assert_eq!(outcome, Outcome::completed(Variables::new()));
        assert_eq!(gateway.total_charged().await, Money::from_units(20));
    }

    #[tokio::test]
    async fn test_lowercase_cvc_is_accepted() {
        let (handler, _) = handler().await;
        let outcome = handler
            .execute(&job(json!({
                "cardNumber": "4111111111111111",
                "cvc": "123",
                "expiryDate": "12/28",
                "openAmount": 20,
            })))
            .await;
        assert_eq!(outcome, Outcome::completed(Variables::new()));
    }

    #[tokio::test]
    async fn test_redelivery_charges_once() {
        let (handler, gateway) = handler().await;
        let j = card_job("4111111111111111", "123", "12/28");
        handler.execute(&j).await;
        handler.execute(&j).await;
        assert_eq!(gateway.charge_count().await, 1);
        assert_eq!(gateway.total_charged().await, Money::from_units(20));
    }

    #[tokio::test]
    async fn test_invalid_card_data_is_business_error() {
        let (handler, gateway) = handler().await;
        for j in [
            card_job("4111111111111112", "123", "12/28"),
            card_job("4111", "123", "12/28"),
            card_job("4111111111111111", "1", "12/28"),
            card_job("4111111111111111", "123", "28-12"),
            job(json!({"CVC": "123", "expiryDate": "12/28", "openAmount": 20.0})),
            job(json!({"cardNumber": 4111111111111111u64, "CVC": "123", "expiryDate": "12/28", "openAmount": 20.0})),
        ] {
            let outcome = handler.execute(&j).await;
            assert!(is_card_error(&outcome), "got {outcome:?}");
        }
        assert_eq!(gateway.charge_count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_card_is_terminal_technical_failure() {
        let (handler, _) = handler().await;
        let outcome = handler
            .execute(&card_job("4111111111111111", "123", "01/26"))
            .await;
        assert!(
            matches!(&outcome, Outcome::TechnicalFailure { retries: 0, message } if message.contains("expired")),
            "got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_other_gateway_errors_are_terminal() {
        let (handler, _) = handler().await;
        for failure in [
            GatewayError::Declined("insufficient funds".to_string()),
            GatewayError::Unavailable("timeout".to_string()),
        ] {
            handler.gateway.set_failure(Some(failure)).await;
            let outcome = handler
                .execute(&card_job("4111111111111111", "123", "12/28"))
                .await;
            assert!(matches!(outcome, Outcome::TechnicalFailure { retries: 0, .. }));
        }
    }

    #[tokio::test]
    async fn test_negative_open_amount_is_invalid_input() {
        let (handler, _) = handler().await;
        let outcome = handler
            .execute(&job(json!({
                "cardNumber": "4111111111111111",
                "CVC": "123",
                "expiryDate": "12/28",
                "openAmount": -5.0,
            })))
            .await;
        assert!(matches!(&outcome, Outcome::BusinessError { code, .. } if code == job_types::INVALID_INPUT_ERROR));
    }
}
