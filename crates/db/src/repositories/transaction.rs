//! Transaction repository for reading stored transactions.
//!
//! Writes go through the ledger engine and [`super::SeaOrmLedgerStore`].

use ledgerline_shared::types::{AccountId, TransactionId};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::transactions;

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets one transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<transactions::Model>, DbErr> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Lists an account's transactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(transactions::Column::EventAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await
    }
}
