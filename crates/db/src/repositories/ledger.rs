//! SeaORM-backed [`LedgerStore`].
//!
//! Each ledger scope is one database transaction. On backends that support
//! it, outstanding debits are read with `SELECT ... FOR UPDATE` so two credits
//! on the same account serialize on the debit rows.

use ledgerline_core::ledger::{LedgerScope, LedgerStore, NewTransaction, OutstandingDebit};
use ledgerline_shared::types::{AccountId, OperationTypeId, TransactionId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    Set, TransactionTrait,
};

use crate::entities::transactions;

/// Postgres `serialization_failure`, also used by MySQL for deadlocks.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// Postgres `deadlock_detected`.
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";
/// SQLite `SQLITE_BUSY`.
const SQLITE_BUSY: i64 = 5;
/// SQLite `SQLITE_LOCKED`.
const SQLITE_LOCKED: i64 = 6;

/// Ledger store over a SeaORM connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl LedgerStore for SeaOrmLedgerStore {
    type Error = DbErr;
    type Scope = SeaOrmLedgerScope;

    async fn begin(&self) -> Result<SeaOrmLedgerScope, DbErr> {
        let txn = self.db.begin().await?;
        Ok(SeaOrmLedgerScope { txn })
    }

    fn is_transient_conflict(&self, error: &DbErr) -> bool {
        is_transient_conflict(self.db.get_database_backend(), error)
    }
}

/// One open database transaction.
#[derive(Debug)]
pub struct SeaOrmLedgerScope {
    txn: DatabaseTransaction,
}

impl LedgerScope for SeaOrmLedgerScope {
    type Error = DbErr;

    async fn insert_transaction(&mut self, row: &NewTransaction) -> Result<TransactionId, DbErr> {
        let model = transactions::ActiveModel {
            account_id: Set(row.account_id.into_inner()),
            operation_type_id: Set(row.operation_type_id.into_inner()),
            amount: Set(row.amount),
            balance: Set(row.balance),
            event_at: Set(row.event_at.into()),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;

        Ok(TransactionId::new(model.id))
    }

    async fn outstanding_debits(
        &mut self,
        account_id: AccountId,
        debit_types: &[OperationTypeId],
    ) -> Result<Vec<OutstandingDebit>, DbErr> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.into_inner()))
            .filter(
                transactions::Column::OperationTypeId
                    .is_in(debit_types.iter().map(|id| id.into_inner())),
            )
            .filter(transactions::Column::Balance.lt(Decimal::ZERO))
            .order_by_asc(transactions::Column::EventAt)
            .order_by_asc(transactions::Column::Id);

        // SQLite has no row locks; its writer lock already serializes scopes.
        if self.txn.get_database_backend() != DatabaseBackend::Sqlite {
            query = query.lock_exclusive();
        }

        let rows = query.all(&self.txn).await?;
        Ok(rows
            .into_iter()
            .map(|r| OutstandingDebit::new(TransactionId::new(r.id), r.balance))
            .collect())
    }

    async fn update_balance(&mut self, id: TransactionId, balance: Decimal) -> Result<(), DbErr> {
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::Balance, Expr::value(balance))
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .exec(&self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotUpdated);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Returns true if `error` is lock or serialization contention reported by
/// a database of the given backend.
pub fn is_transient_conflict(backend: DatabaseBackend, error: &DbErr) -> bool {
    let runtime = match error {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };
    let RuntimeErr::SqlxError(sqlx::Error::Database(db_error)) = runtime else {
        return false;
    };
    db_error
        .code()
        .is_some_and(|code| is_transient_code(backend, &code))
}

fn is_transient_code(backend: DatabaseBackend, code: &str) -> bool {
    match backend {
        // Extended result codes; the low byte is the primary code.
        DatabaseBackend::Sqlite => code
            .parse::<i64>()
            .is_ok_and(|extended| matches!(extended & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        DatabaseBackend::Postgres | DatabaseBackend::MySql => {
            code == SQLSTATE_SERIALIZATION_FAILURE || code == SQLSTATE_DEADLOCK_DETECTED
        }
    }
}
