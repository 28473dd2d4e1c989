//! In-memory [`LedgerStore`] for engine tests.
//!
//! A scope holds the store lock for its whole lifetime and works on a copy of
//! the ledger, so scopes are serialized and an uncommitted scope leaves no
//! trace. Faults can be queued per stage to simulate store errors.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ledgerline_shared::types::{AccountId, OperationTypeId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::Stage;
use super::store::{LedgerScope, LedgerStore};
use super::types::{NewTransaction, OutstandingDebit};

/// Kind of injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Contention that a retry resolves.
    Deadlock,
    /// A failure a retry does not resolve.
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("deadlock found when trying to get lock during {0}")]
    Deadlock(Stage),
    #[error("store failure during {0}")]
    Broken(Stage),
}

/// A committed transaction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub operation_type_id: OperationTypeId,
    pub amount: Decimal,
    pub balance: Decimal,
    pub event_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    rows: Vec<StoredTransaction>,
    next_id: i64,
}

#[derive(Debug, Default)]
struct Inner {
    ledger: Ledger,
    faults: VecDeque<(Stage, Fault)>,
    begins: usize,
    rollbacks: usize,
}

impl Inner {
    fn take_fault(&mut self, stage: Stage) -> Result<(), MemoryError> {
        let Some(index) = self.faults.iter().position(|(s, _)| *s == stage) else {
            return Ok(());
        };
        match self.faults.remove(index) {
            Some((_, Fault::Deadlock)) => Err(MemoryError::Deadlock(stage)),
            Some((_, Fault::Broken)) => Err(MemoryError::Broken(stage)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a failure for the next time `stage` is reached.
    pub async fn fail_next(&self, stage: Stage, fault: Fault) {
        self.inner.lock().await.faults.push_back((stage, fault));
    }

    /// Committed rows in insertion order.
    pub async fn snapshot(&self) -> Vec<StoredTransaction> {
        self.inner.lock().await.ledger.rows.clone()
    }

    pub async fn begins(&self) -> usize {
        self.inner.lock().await.begins
    }

    pub async fn rollbacks(&self) -> usize {
        self.inner.lock().await.rollbacks
    }
}

impl LedgerStore for MemoryStore {
    type Error = MemoryError;
    type Scope = MemoryScope;

    async fn begin(&self) -> Result<MemoryScope, MemoryError> {
        let mut guard = Arc::clone(&self.inner).lock_owned().await;
        guard.begins += 1;
        guard.take_fault(Stage::Begin)?;
        let working = guard.ledger.clone();
        Ok(MemoryScope { guard, working })
    }

    fn is_transient_conflict(&self, error: &MemoryError) -> bool {
        matches!(error, MemoryError::Deadlock(_))
    }
}

pub struct MemoryScope {
    guard: OwnedMutexGuard<Inner>,
    working: Ledger,
}

impl LedgerScope for MemoryScope {
    type Error = MemoryError;

    async fn insert_transaction(
        &mut self,
        row: &NewTransaction,
    ) -> Result<TransactionId, MemoryError> {
        self.guard.take_fault(Stage::Insert)?;
        self.working.next_id += 1;
        let id = TransactionId::new(self.working.next_id);
        self.working.rows.push(StoredTransaction {
            id,
            account_id: row.account_id,
            operation_type_id: row.operation_type_id,
            amount: row.amount,
            balance: row.balance,
            event_at: row.event_at,
        });
        Ok(id)
    }

    async fn outstanding_debits(
        &mut self,
        account_id: AccountId,
        debit_types: &[OperationTypeId],
    ) -> Result<Vec<OutstandingDebit>, MemoryError> {
        self.guard.take_fault(Stage::LoadDebits)?;
        let mut rows: Vec<&StoredTransaction> = self
            .working
            .rows
            .iter()
            .filter(|r| {
                r.account_id == account_id
                    && debit_types.contains(&r.operation_type_id)
                    && r.balance < Decimal::ZERO
            })
            .collect();
        rows.sort_by_key(|r| (r.event_at, r.id));
        Ok(rows
            .into_iter()
            .map(|r| OutstandingDebit::new(r.id, r.balance))
            .collect())
    }

    async fn update_balance(
        &mut self,
        id: TransactionId,
        balance: Decimal,
    ) -> Result<(), MemoryError> {
        self.guard.take_fault(Stage::UpdateBalance)?;
        if let Some(row) = self.working.rows.iter_mut().find(|r| r.id == id) {
            row.balance = balance;
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<(), MemoryError> {
        self.guard.take_fault(Stage::Commit)?;
        self.guard.ledger = self.working;
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), MemoryError> {
        self.guard.rollbacks += 1;
        Ok(())
    }
}
