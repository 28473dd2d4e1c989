//! Ledger writer: one atomic unit of work per transaction.

use std::sync::Arc;

use chrono::Utc;
use ledgerline_shared::types::{Direction, TransactionId};
use tracing::{debug, warn};

use super::direction::OperationTypes;
use super::discharge::allocate;
use super::error::{LedgerError, Stage};
use super::store::{LedgerScope, LedgerStore};
use super::types::{NewTransaction, TransactionRequest};

/// Writes validated transactions to a [`LedgerStore`].
///
/// Each call to [`write`](Self::write) runs in its own scope:
/// 1. Insert the transaction with `balance = amount`
/// 2. For credits, discharge the account's outstanding debits oldest first
///    and store the credit's remaining balance
/// 3. Commit, or roll back on any failure
#[derive(Debug)]
pub struct LedgerWriter<S> {
    store: S,
    operation_types: Arc<OperationTypes>,
}

impl<S: LedgerStore> LedgerWriter<S> {
    /// Creates a new writer.
    #[must_use]
    pub fn new(store: S, operation_types: Arc<OperationTypes>) -> Self {
        Self {
            store,
            operation_types,
        }
    }

    /// Records one transaction atomically.
    ///
    /// `direction` is the validated direction of the request's operation
    /// type. The row is derived from `request` on every call, so repeated
    /// calls never share state.
    ///
    /// # Errors
    ///
    /// Returns `TransientConflict` or `PersistenceFailure` (depending on how
    /// the store classifies the error) tagged with the failing stage. No
    /// write is visible after an error.
    pub async fn write(
        &self,
        request: &TransactionRequest,
        direction: Direction,
    ) -> Result<TransactionId, LedgerError> {
        let mut scope = self
            .store
            .begin()
            .await
            .map_err(|e| self.classify(Stage::Begin, &e))?;

        match self.apply(&mut scope, request, direction).await {
            Ok(transaction_id) => {
                scope
                    .commit()
                    .await
                    .map_err(|e| self.classify(Stage::Commit, &e))?;

                debug!(
                    account_id = %request.account_id,
                    transaction_id = %transaction_id,
                    amount = %request.amount,
                    "Transaction committed"
                );
                Ok(transaction_id)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback().await {
                    warn!(
                        account_id = %request.account_id,
                        error = %rollback_err,
                        "Rollback failed; scope discarded"
                    );
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        scope: &mut S::Scope,
        request: &TransactionRequest,
        direction: Direction,
    ) -> Result<TransactionId, LedgerError> {
        let row = NewTransaction::from_request(request, Utc::now());

        let transaction_id = scope
            .insert_transaction(&row)
            .await
            .map_err(|e| self.classify(Stage::Insert, &e))?;

        if direction == Direction::Credit {
            let debts = scope
                .outstanding_debits(row.account_id, self.operation_types.debit_type_ids())
                .await
                .map_err(|e| self.classify(Stage::LoadDebits, &e))?;

            let discharge = allocate(row.amount, &debts);

            for update in &discharge.updates {
                scope
                    .update_balance(update.id, update.balance)
                    .await
                    .map_err(|e| self.classify(Stage::UpdateBalance, &e))?;
            }

            scope
                .update_balance(transaction_id, discharge.remainder)
                .await
                .map_err(|e| self.classify(Stage::UpdateBalance, &e))?;

            debug!(
                account_id = %row.account_id,
                transaction_id = %transaction_id,
                debts_paid = discharge.updates.len(),
                remainder = %discharge.remainder,
                "Credit discharged"
            );
        }

        Ok(transaction_id)
    }

    fn classify(&self, stage: Stage, error: &S::Error) -> LedgerError {
        if self.store.is_transient_conflict(error) {
            LedgerError::TransientConflict {
                stage,
                message: error.to_string(),
            }
        } else {
            LedgerError::PersistenceFailure {
                stage,
                message: error.to_string(),
            }
        }
    }
}
