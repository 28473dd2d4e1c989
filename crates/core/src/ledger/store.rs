//! Store traits for the ledger unit of work.
//!
//! These traits are implemented by the db crate to provide the actual
//! transactional store. The engine only ever talks to the store through a
//! [`LedgerScope`] obtained from [`LedgerStore::begin`].

use std::future::Future;

use ledgerline_shared::types::{AccountId, OperationTypeId, TransactionId};
use rust_decimal::Decimal;

use super::types::{NewTransaction, OutstandingDebit};

/// A transactional store holding the ledger.
pub trait LedgerStore: Send + Sync {
    /// Error type of the store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The transactional scope type.
    type Scope: LedgerScope<Error = Self::Error>;

    /// Opens a transactional scope.
    fn begin(&self) -> impl Future<Output = Result<Self::Scope, Self::Error>> + Send;

    /// Returns true if `error` is lock or serialization contention that is
    /// expected to succeed when the unit of work is retried.
    fn is_transient_conflict(&self, error: &Self::Error) -> bool;
}

/// An open transactional scope.
///
/// Nothing written through a scope is visible outside of it until
/// [`commit`](LedgerScope::commit) succeeds. Dropping a scope without
/// committing must discard its writes.
pub trait LedgerScope: Send {
    /// Error type of the scope.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts a transaction row and returns its assigned ID.
    fn insert_transaction(
        &mut self,
        row: &NewTransaction,
    ) -> impl Future<Output = Result<TransactionId, Self::Error>> + Send;

    /// Selects the account's transactions of the given debit types that still
    /// have a negative balance, oldest first.
    ///
    /// Implementations should lock the returned rows until the scope ends
    /// where the underlying store supports it.
    fn outstanding_debits(
        &mut self,
        account_id: AccountId,
        debit_types: &[OperationTypeId],
    ) -> impl Future<Output = Result<Vec<OutstandingDebit>, Self::Error>> + Send;

    /// Overwrites the balance of one transaction.
    fn update_balance(
        &mut self,
        id: TransactionId,
        balance: Decimal,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Commits all writes of the scope.
    fn commit(self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Discards all writes of the scope.
    fn rollback(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
