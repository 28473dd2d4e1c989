//! Ledger error types.
//!
//! This module defines all errors that can occur while recording a
//! transaction: client input errors found by direction validation, store
//! failures raised inside the unit of work, and the aggregate error of the
//! parallel write harness.

use std::fmt;

use ledgerline_shared::types::{Direction, OperationTypeId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Step of the unit of work at which a store error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the transactional scope.
    Begin,
    /// Inserting the new transaction row.
    Insert,
    /// Selecting the account's outstanding debits.
    LoadDebits,
    /// Writing back a discharged balance.
    UpdateBalance,
    /// Committing the scope.
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Begin => "begin",
            Self::Insert => "insert",
            Self::LoadDebits => "load debits",
            Self::UpdateBalance => "update balance",
            Self::Commit => "commit",
        };
        f.write_str(stage)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Operation type is not in the operation type table.
    #[error("Invalid operation type ID: {0}")]
    UnknownOperationType(OperationTypeId),

    /// Amount sign disagrees with the operation type's direction.
    #[error(
        "Invalid transaction amount {amount} for the given operation type ID {operation_type}: expected {expected} direction"
    )]
    DirectionMismatch {
        /// The operation type of the request.
        operation_type: OperationTypeId,
        /// The requested amount.
        amount: Decimal,
        /// The direction the operation type requires.
        expected: Direction,
    },

    // ========== Store Errors ==========
    /// The store reported lock or serialization contention.
    #[error("Transient conflict during {stage}: {message}")]
    TransientConflict {
        /// Where in the unit of work the conflict surfaced.
        stage: Stage,
        /// Store error message.
        message: String,
    },

    /// Any other store failure. The unit of work was rolled back.
    #[error("Persistence failure during {stage}: {message}")]
    PersistenceFailure {
        /// Where in the unit of work the failure surfaced.
        stage: Stage,
        /// Store error message.
        message: String,
    },

    // ========== Harness Errors ==========
    /// Some parallel writes failed.
    #[error("{failed} of {attempted} parallel writes failed: {source}", attempted = .succeeded + .failed)]
    PartialFanOutFailure {
        /// Writes that committed.
        succeeded: usize,
        /// Writes that failed.
        failed: usize,
        /// The first failure observed.
        source: Box<LedgerError>,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownOperationType(_) => "UNKNOWN_OPERATION_TYPE",
            Self::DirectionMismatch { .. } => "DIRECTION_MISMATCH",
            Self::TransientConflict { .. } => "TRANSIENT_CONFLICT",
            Self::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
            Self::PartialFanOutFailure { .. } => "PARTIAL_FAN_OUT_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - client input
            Self::UnknownOperationType(_) | Self::DirectionMismatch { .. } => 400,

            // 409 Conflict - contention that outlived its retries
            Self::TransientConflict { .. } => 409,

            // 500 Internal Server Error
            Self::PersistenceFailure { .. } | Self::PartialFanOutFailure { .. } | Self::Internal(_) => {
                500
            }
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientConflict { .. })
    }

    /// Returns true if this error was caused by the request itself.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperationType(_) | Self::DirectionMismatch { .. }
        )
    }
}
