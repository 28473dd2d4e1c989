//! Debt discharge.
//!
//! A credit pays off the account's outstanding debits oldest first. The
//! allocation is a strict waterfall:
//! 1. Each debt the remaining credit exceeds is settled to zero
//! 2. The first debt the remaining credit cannot exceed absorbs all of it
//!    and the walk stops there
//! 3. Whatever is left becomes the credit's own balance
//!
//! Debts after the stopping point are never touched, even when smaller than
//! the debt that stopped the walk.

use rust_decimal::Decimal;

use super::types::{BalanceUpdate, OutstandingDebit};

/// Result of discharging one credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discharge {
    /// New balances for the debits that were paid, in payment order.
    pub updates: Vec<BalanceUpdate>,
    /// Credit left after paying debts. Zero or positive.
    pub remainder: Decimal,
}

impl Discharge {
    /// Total amount taken from the credit.
    #[must_use]
    pub fn applied(&self, credit: Decimal) -> Decimal {
        credit - self.remainder
    }
}

/// Allocates `credit` over `debts`, which must be ordered oldest first.
///
/// Entries with a non-negative balance are not debts and are skipped. A zero
/// credit produces no updates.
#[must_use]
pub fn allocate(credit: Decimal, debts: &[OutstandingDebit]) -> Discharge {
    let mut remaining = credit;
    let mut updates = Vec::new();

    for debt in debts {
        if remaining <= Decimal::ZERO {
            break;
        }
        if debt.balance >= Decimal::ZERO {
            continue;
        }

        let owed = debt.balance.abs();
        if remaining > owed {
            remaining -= owed;
            updates.push(BalanceUpdate {
                id: debt.id,
                balance: Decimal::ZERO,
            });
        } else {
            updates.push(BalanceUpdate {
                id: debt.id,
                balance: debt.balance + remaining,
            });
            remaining = Decimal::ZERO;
            break;
        }
    }

    Discharge {
        updates,
        remainder: remaining,
    }
}
