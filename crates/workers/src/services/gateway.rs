//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use ledger::Money;
use thiserror::Error;
use tokio::sync::RwLock;

/// Card data as entered by the customer.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub cvc: String,
    /// `MM/YY` or `MM/YYYY`.
    pub expiry: String,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        cvc: impl Into<String>,
        expiry: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            cvc: cvc.into(),
            expiry: expiry.into(),
        }
    }

    /// Card number with all but the last four digits masked.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(|c| !c.is_whitespace()).collect();
        let visible = digits.len().min(4);
        let mut masked = "*".repeat(digits.len() - visible);
        masked.extend(&digits[digits.len() - visible..]);
        masked
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.masked_number())
            .field("cvc", &"***")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// A request to charge a card.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub card: CardDetails,
    pub amount: Money,
    /// Repeating a request with the same key must not charge twice.
    pub idempotency_key: String,
}

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    /// The charge ID assigned by the gateway.
    pub charge_id: String,
    pub amount: Money,
    /// True if the gateway answered from a previous request with the same key.
    pub replayed: bool,
}

/// Errors reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Card data or amount is malformed.
    #[error("Invalid card data: {0}")]
    InvalidCardData(String),

    /// The card's expiry date has passed.
    #[error("Credit card expired: {0}")]
    CardExpired(String),

    /// The issuer declined the charge.
    #[error("Charge declined: {0}")]
    Declined(String),

    /// The gateway could not be reached.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Returns true if the request itself was malformed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GatewayError::InvalidCardData(_))
    }
}

/// Trait for card payment gateways.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges `request.amount` to the card.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, GatewayError>;
}

#[derive(Debug)]
struct GatewayState {
    charges: HashMap<String, ChargeReceipt>,
    today: NaiveDate,
    failure: Option<GatewayError>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            charges: HashMap::new(),
            today: Utc::now().date_naive(),
            failure: None,
        }
    }
}

/// In-memory payment gateway for testing.
///
/// Validates card data the way a real gateway would (digits, Luhn checksum,
/// CVC length, expiry format), rejects expired cards relative to a
/// configurable current date and deduplicates by idempotency key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date expiry checks are made against.
    pub async fn set_today(&self, today: NaiveDate) {
        self.state.write().await.today = today;
    }

    /// Makes every new charge fail with `failure`, or clears it with `None`.
    pub async fn set_failure(&self, failure: Option<GatewayError>) {
        self.state.write().await.failure = failure;
    }

    /// Returns the number of distinct charges made.
    pub async fn charge_count(&self) -> usize {
        self.state.read().await.charges.len()
    }

    /// Returns the total amount charged.
    pub async fn total_charged(&self) -> Money {
        self.state
            .read()
            .await
            .charges
            .values()
            .fold(Money::zero(), |acc, receipt| acc + receipt.amount)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    #[tracing::instrument(skip(self, request), fields(card = %request.card.masked_number(), amount = %request.amount))]
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, GatewayError> {
        let mut state = self.state.write().await;

        if let Some(previous) = state.charges.get(&request.idempotency_key) {
            tracing::info!(charge_id = %previous.charge_id, "charge already made, replaying receipt");
            return Ok(ChargeReceipt {
                replayed: true,
                ..previous.clone()
            });
        }

        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }

        validate_card(&request.card, state.today)?;
        if request.amount.is_negative() {
            return Err(GatewayError::InvalidCardData(format!(
                "amount must not be negative, got {}",
                request.amount
            )));
        }

        let receipt = ChargeReceipt {
            charge_id: format!("ch_{}", uuid::Uuid::new_v4().simple()),
            amount: request.amount,
            replayed: false,
        };
        state
            .charges
            .insert(request.idempotency_key, receipt.clone());

        metrics::counter!("gateway_charges_total").increment(1);
        tracing::info!(charge_id = %receipt.charge_id, "card charged");
        Ok(receipt)
    }
}

fn validate_card(card: &CardDetails, today: NaiveDate) -> Result<(), GatewayError> {
    let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if !(13..=19).contains(&number.len()) || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::InvalidCardData(
            "card number must be 13 to 19 digits".to_string(),
        ));
    }
    if !luhn_valid(&number) {
        return Err(GatewayError::InvalidCardData(
            "card number checksum mismatch".to_string(),
        ));
    }
    if !(3..=4).contains(&card.cvc.len()) || !card.cvc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::InvalidCardData(
            "CVC must be 3 or 4 digits".to_string(),
        ));
    }

    let (year, month) = parse_expiry(&card.expiry).ok_or_else(|| {
        GatewayError::InvalidCardData(format!(
            "expiry date '{}' must be MM/YY or MM/YYYY",
            card.expiry
        ))
    })?;
    // Cards are valid through the last day of their expiry month.
    if (year, month) < (today.year(), today.month()) {
        return Err(GatewayError::CardExpired(card.expiry.clone()));
    }
    Ok(())
}

fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let (month, year) = expiry.trim().split_once('/')?;
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if month.len() != 2 || !matches!(year.len(), 2 | 4) || !digits(month) || !digits(year) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year = if year < 100 { 2000 + year } else { year };
    Some((year, month))
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
