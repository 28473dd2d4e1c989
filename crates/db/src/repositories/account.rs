//! Account repository.

use chrono::Utc;
use ledgerline_shared::AppError;
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, SqlErr,
};
use tracing::info;

use crate::entities::{accounts, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Document number already belongs to another account.
    #[error("Account with document number '{0}' already exists")]
    DuplicateDocumentNumber(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateDocumentNumber(_) => Self::Conflict(err.to_string()),
            AccountError::NotFound(_) => Self::NotFound(err.to_string()),
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Account with its net outstanding position.
#[derive(Debug, Clone)]
pub struct AccountWithPosition {
    /// The account record.
    pub account: accounts::Model,
    /// Sum of the balances of all the account's transactions. Negative while
    /// debits are outstanding, positive when unspent credit remains.
    pub balance: Decimal,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account for `document_number`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDocumentNumber` if the number is already in use.
    pub async fn create_account(
        &self,
        document_number: &str,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::DocumentNumber.eq(document_number))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateDocumentNumber(
                document_number.to_string(),
            ));
        }

        let inserted = accounts::ActiveModel {
            document_number: Set(document_number.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        // Lost a race with a concurrent insert of the same number.
        let account = match inserted {
            Ok(account) => account,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AccountError::DuplicateDocumentNumber(
                    document_number.to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        info!(account_id = account.id, "Account created");
        Ok(account)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Gets an account with its net position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get_account(&self, id: AccountId) -> Result<AccountWithPosition, AccountError> {
        let account = self
            .find_account(id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let balances: Vec<Decimal> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Balance)
            .filter(transactions::Column::AccountId.eq(account.id))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(AccountWithPosition {
            account,
            balance: balances.into_iter().sum(),
        })
    }
}
