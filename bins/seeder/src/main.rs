//! Database seeder for Ledgerline development and testing.
//!
//! Creates a sample account and records a debit followed by a credit that
//! discharges it, then prints the resulting balances.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use ledgerline_core::ledger::{TransactionRequest, TransactionService};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_db::{AccountError, AccountRepository, SeaOrmLedgerStore, TransactionRepository};
use ledgerline_shared::AppConfig;
use ledgerline_shared::types::{AccountId, OperationTypeId};
use rust_decimal_macros::dec;

/// Document number of the sample account.
const SAMPLE_DOCUMENT_NUMBER: &str = "123456789";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = ledgerline_db::connect_with(&config.database).await?;
    Migrator::up(&db, None).await?;

    println!("Seeding sample account...");
    let accounts = AccountRepository::new(db.clone());
    let account_id = match accounts.create_account(SAMPLE_DOCUMENT_NUMBER).await {
        Ok(account) => AccountId::new(account.id),
        Err(AccountError::DuplicateDocumentNumber(_)) => {
            println!("Sample account already exists, skipping");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let service =
        TransactionService::from_config(SeaOrmLedgerStore::new(db.clone()), &config.ledger);

    println!("Seeding transactions...");
    let debit = service
        .create_transaction(TransactionRequest::new(
            account_id,
            OperationTypeId::new(1),
            dec!(-50.0),
        ))
        .await?;
    let credit = service
        .create_transaction(TransactionRequest::new(
            account_id,
            OperationTypeId::new(4),
            dec!(100.0),
        ))
        .await?;

    let transactions = TransactionRepository::new(db);
    for id in [debit, credit] {
        if let Some(row) = transactions.get_transaction(id).await? {
            println!(
                "  transaction {} type {} amount {} balance {}",
                row.id, row.operation_type_id, row.amount, row.balance
            );
        }
    }

    println!("Seeding complete!");
    Ok(())
}
