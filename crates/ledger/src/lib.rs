//! Customer credit ledger.
//!
//! Looks up how much credit a customer has and deducts an order total from
//! it. Every deduction yields a [`DeductionResult`] whose deducted and open
//! amounts add up to the order total exactly; amounts are kept in whole
//! cents to make that hold.
//!
//! Two ledgers are provided:
//! - [`DerivedCreditLedger`]: stateless, credit derived from the customer id
//! - [`InMemoryCreditLedger`]: keeps balances and records each deduction by
//!   reference so a redelivered job does not deduct twice

pub mod customer;
pub mod derived;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod money;

pub use customer::CustomerId;
pub use derived::DerivedCreditLedger;
pub use error::{LedgerError, Result};
pub use ledger::{CreditLedger, DeductionResult};
pub use memory::InMemoryCreditLedger;
pub use money::Money;
