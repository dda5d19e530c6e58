//! One handler per job type.

pub mod card_charge;
pub mod credit_deduction;
pub mod discount;
pub mod payment_completion;
pub mod payment_invocation;

pub use card_charge::CardChargeHandler;
pub use credit_deduction::CreditDeductionHandler;
pub use discount::DiscountHandler;
pub use payment_completion::PaymentCompletionHandler;
pub use payment_invocation::PaymentInvocationHandler;

use ledger::Money;

use crate::error::WorkerError;

/// Converts a non-negative amount variable to [`Money`].
fn amount(name: &str, value: f64) -> Result<Money, WorkerError> {
    if value < 0.0 {
        return Err(WorkerError::InvalidInput(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Money::from_f64(value)
        .ok_or_else(|| WorkerError::InvalidInput(format!("{name} is not a valid amount: {value}")))
}
