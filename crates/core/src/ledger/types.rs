//! Ledger domain types for transaction creation and discharge.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::{AccountId, OperationTypeId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A request to record one transaction against an account.
///
/// This is the immutable input of the engine. Every write attempt derives a
/// fresh [`NewTransaction`] from it, so a failed attempt never leaks state
/// into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Owning account.
    pub account_id: AccountId,
    /// Operation type, decides the required sign of `amount`.
    pub operation_type_id: OperationTypeId,
    /// Signed amount. Debits are negative, credits positive.
    pub amount: Decimal,
}

impl TransactionRequest {
    /// Creates a new request.
    #[must_use]
    pub const fn new(
        account_id: AccountId,
        operation_type_id: OperationTypeId,
        amount: Decimal,
    ) -> Self {
        Self {
            account_id,
            operation_type_id,
            amount,
        }
    }
}

/// The row inserted for a transaction, before discharge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owning account.
    pub account_id: AccountId,
    /// Operation type.
    pub operation_type_id: OperationTypeId,
    /// Signed amount as requested.
    pub amount: Decimal,
    /// Unsettled part of the amount. Starts equal to `amount`.
    pub balance: Decimal,
    /// Event timestamp, orders discharge.
    pub event_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Derives the row for one write attempt.
    #[must_use]
    pub fn from_request(request: &TransactionRequest, event_at: DateTime<Utc>) -> Self {
        Self {
            account_id: request.account_id,
            operation_type_id: request.operation_type_id,
            amount: request.amount,
            balance: request.amount,
            event_at,
        }
    }
}

/// A debit that still carries a negative balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutstandingDebit {
    /// Transaction ID of the debit.
    pub id: TransactionId,
    /// Current (negative) balance.
    pub balance: Decimal,
}

impl OutstandingDebit {
    /// Creates an outstanding debit.
    #[must_use]
    pub const fn new(id: TransactionId, balance: Decimal) -> Self {
        Self { id, balance }
    }
}

/// A balance to write back after discharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// Transaction whose balance changes.
    pub id: TransactionId,
    /// New balance.
    pub balance: Decimal,
}
