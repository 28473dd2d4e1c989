//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for accounts and transactions
//! - Error to response mapping
//! - Shared application state

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use ledgerline_core::ledger::TransactionService;
use ledgerline_db::SeaOrmLedgerStore;
use ledgerline_shared::config::LedgerConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Ledger engine writing through the database.
    pub ledger: Arc<TransactionService<SeaOrmLedgerStore>>,
    /// Number of writes fired by the concurrent endpoint.
    pub fan_out_count: usize,
}

impl AppState {
    /// Builds the state from a connection and the `ledger` config section.
    #[must_use]
    pub fn new(db: DatabaseConnection, ledger: &LedgerConfig) -> Self {
        let service = TransactionService::from_config(SeaOrmLedgerStore::new(db.clone()), ledger);
        Self {
            db: Arc::new(db),
            ledger: Arc::new(service),
            fan_out_count: ledger.fan_out_count,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
