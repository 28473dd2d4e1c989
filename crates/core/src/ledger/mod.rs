//! Ledger transaction engine.
//!
//! This module implements the write path for account transactions:
//! - Direction validation against the operation type table
//! - Debt discharge (FIFO waterfall of a credit over outstanding debits)
//! - Atomic unit of work against a transactional store
//! - Retry with backoff on transient store conflicts
//! - Parallel write harness for contention testing
//! - Error types for ledger operations

pub mod direction;
pub mod discharge;
pub mod error;
pub mod harness;
pub mod retry;
pub mod service;
pub mod store;
pub mod types;
pub mod writer;

#[cfg(test)]
mod direction_props;
#[cfg(test)]
mod discharge_props;
#[cfg(test)]
pub(crate) mod memory_store;

pub use direction::{OperationType, OperationTypes, validate_direction};
pub use discharge::{Discharge, allocate};
pub use error::{LedgerError, Stage};
pub use harness::FanOutOutcome;
pub use retry::{Backoff, RetryPolicy};
pub use service::TransactionService;
pub use store::{LedgerScope, LedgerStore};
pub use types::{BalanceUpdate, NewTransaction, OutstandingDebit, TransactionRequest};
pub use writer::LedgerWriter;
