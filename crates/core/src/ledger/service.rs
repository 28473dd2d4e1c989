//! Transaction service: validation, atomic write and retry.
//!
//! This is the entry point of the engine. A request is validated once, then
//! written through the [`LedgerWriter`] under the [`RetryPolicy`]. Each retry
//! re-runs the whole unit of work from the immutable request.

use std::sync::Arc;
use std::time::Duration;

use ledgerline_shared::config::LedgerConfig;
use ledgerline_shared::types::{Direction, OperationTypeId, TransactionId};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{info, warn};

use super::direction::OperationTypes;
use super::error::LedgerError;
use super::retry::RetryPolicy;
use super::store::LedgerStore;
use super::types::TransactionRequest;
use super::writer::LedgerWriter;

/// Records transactions against a [`LedgerStore`].
#[derive(Debug)]
pub struct TransactionService<S> {
    operation_types: Arc<OperationTypes>,
    writer: LedgerWriter<S>,
    retry: RetryPolicy,
    pub(super) max_jitter: Duration,
}

impl<S: LedgerStore> TransactionService<S> {
    /// Creates a service with the standard operation types and default retry
    /// policy.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_parts(
            store,
            OperationTypes::standard(),
            RetryPolicy::default(),
            Duration::from_millis(100),
        )
    }

    /// Creates a service from the `ledger` config section.
    #[must_use]
    pub fn from_config(store: S, config: &LedgerConfig) -> Self {
        Self::with_parts(
            store,
            OperationTypes::from_config(&config.operation_types),
            RetryPolicy::from_config(config),
            Duration::from_millis(config.fan_out_max_jitter_ms),
        )
    }

    /// Creates a service from explicit parts.
    #[must_use]
    pub fn with_parts(
        store: S,
        operation_types: OperationTypes,
        retry: RetryPolicy,
        max_jitter: Duration,
    ) -> Self {
        let operation_types = Arc::new(operation_types);
        Self {
            writer: LedgerWriter::new(store, Arc::clone(&operation_types)),
            operation_types,
            retry,
            max_jitter,
        }
    }

    /// The operation type table in use.
    pub fn operation_types(&self) -> &OperationTypes {
        &self.operation_types
    }

    /// Checks that `amount` has the sign `operation_type_id` requires.
    ///
    /// # Errors
    ///
    /// `UnknownOperationType` or `DirectionMismatch`.
    pub fn validate_direction(
        &self,
        operation_type_id: OperationTypeId,
        amount: Decimal,
    ) -> Result<Direction, LedgerError> {
        self.operation_types.validate(operation_type_id, amount)
    }

    /// Validates and records one transaction, retrying transient conflicts.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before the store is touched. Store
    /// errors are returned once they are permanent or retries are exhausted.
    pub async fn create_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionId, LedgerError> {
        self.create_transaction_until(request, None).await
    }

    /// Like [`create_transaction`](Self::create_transaction), but schedules no
    /// retry that would end after `deadline`.
    ///
    /// # Errors
    ///
    /// See [`create_transaction`](Self::create_transaction).
    pub async fn create_transaction_until(
        &self,
        request: TransactionRequest,
        deadline: Option<Instant>,
    ) -> Result<TransactionId, LedgerError> {
        let direction = self.validate_direction(request.operation_type_id, request.amount)?;

        let result = self
            .retry
            .run(deadline, |_| self.writer.write(&request, direction))
            .await;

        match &result {
            Ok(id) => info!(
                account_id = %request.account_id,
                transaction_id = %id,
                operation_type_id = %request.operation_type_id,
                amount = %request.amount,
                "Transaction created"
            ),
            Err(e) => warn!(
                account_id = %request.account_id,
                error = %e,
                "Transaction failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
