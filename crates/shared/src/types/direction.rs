//! Transaction direction.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The sign an amount must carry for a given operation type.
///
/// Debits take money out of an account and are stored as negative amounts.
/// Credits add money and are stored as positive amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Deducts money. Amount must be negative.
    Debit,
    /// Adds money. Amount must not be negative.
    Credit,
}

impl Direction {
    /// Returns the direction implied by the sign of `amount`.
    ///
    /// Zero is not negative and therefore reads as a credit.
    #[must_use]
    pub fn of(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Self::Debit
        } else {
            Self::Credit
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "Debit"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}
