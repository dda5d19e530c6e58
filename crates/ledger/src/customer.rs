//! Customer identifiers.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::money::Money;

/// Number of trailing characters that encode the derived credit.
const CREDIT_DIGITS: usize = 2;

/// A customer identifier that is known to yield a credit value.
///
/// Credit is derived from the last two characters of the identifier, which
/// must be ASCII digits: `"customer-50"` has a credit of 50.00.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Validates a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, LedgerError> {
        let raw = raw.into();
        let invalid = |reason| LedgerError::InvalidCustomerId {
            customer_id: raw.clone(),
            reason,
        };

        if raw.len() < CREDIT_DIGITS {
            return Err(invalid("must be at least two characters long"));
        }
        let suffix = &raw.as_bytes()[raw.len() - CREDIT_DIGITS..];
        if !suffix.iter().all(u8::is_ascii_digit) {
            return Err(invalid("must end in two digits"));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Credit encoded in the identifier's trailing digits.
    pub fn derived_credit(&self) -> Money {
        let units = self.0.as_bytes()[self.0.len() - CREDIT_DIGITS..]
            .iter()
            .fold(0i64, |acc, b| acc * 10 + i64::from(b - b'0'));
        Money::from_units(units)
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
