//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use ledgerline_core::ledger::{FanOutOutcome, LedgerError, TransactionRequest};
use ledgerline_db::{AccountRepository, TransactionRepository};
use ledgerline_shared::{
    AppError,
    types::{AccountId, OperationTypeId, TransactionId},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::AppState;
use crate::error::{app_error_response, bad_request, ledger_error_response};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/concurrent", post(create_transactions_concurrently))
        .route("/transactions/{transaction_id}", get(get_transaction))
}

/// Decimal places the ledger stores.
const AMOUNT_SCALE: u32 = 4;

/// Exclusive bound on the integer part of an amount, matching `NUMERIC(16,4)`.
const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Owning account.
    pub account_id: Option<i64>,
    /// Operation type.
    pub operation_type_id: Option<i32>,
    /// Signed amount. Debits negative, credits positive.
    pub amount: Option<Decimal>,
}

impl CreateTransactionRequest {
    /// Converts the body into an engine request. Every field must be present
    /// and non-zero.
    fn into_request(self) -> Result<TransactionRequest, &'static str> {
        let account_id = self
            .account_id
            .filter(|id| *id != 0)
            .ok_or("account_id is required")?;
        let operation_type_id = self
            .operation_type_id
            .filter(|id| *id != 0)
            .ok_or("operation_type_id is required")?;
        let amount = self
            .amount
            .filter(|amount| !amount.is_zero())
            .ok_or("amount is required and must not be zero")?
            .normalize();
        if amount.scale() > AMOUNT_SCALE {
            return Err("amount must have at most 4 decimal places");
        }
        if amount.abs() >= Decimal::from(AMOUNT_LIMIT) {
            return Err("amount is out of range");
        }

        Ok(TransactionRequest::new(
            AccountId::new(account_id),
            OperationTypeId::new(operation_type_id),
            amount,
        ))
    }
}

/// Response for a stored transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: i64,
    /// Owning account.
    pub account_id: i64,
    /// Operation type.
    pub operation_type_id: i32,
    /// Amount as requested.
    pub amount: String,
    /// Unsettled part of the amount.
    pub balance: String,
    /// Event timestamp.
    pub event_at: DateTime<FixedOffset>,
}

/// Parses the body and confirms the account exists.
async fn prepare(
    state: &AppState,
    payload: CreateTransactionRequest,
) -> Result<TransactionRequest, Response> {
    let request = payload.into_request().map_err(bad_request)?;

    let repo = AccountRepository::new((*state.db).clone());
    match repo.find_account(request.account_id).await {
        Ok(Some(_)) => Ok(request),
        Ok(None) => Err(app_error_response(&AppError::NotFound(format!(
            "Account not found: {}",
            request.account_id
        )))),
        Err(e) => Err(app_error_response(&AppError::Database(e.to_string()))),
    }
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Response {
    let request = match prepare(&state, payload).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.ledger.create_transaction(request).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

async fn create_transactions_concurrently(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Response {
    let request = match prepare(&state, payload).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    // Reject bad input once instead of once per branch.
    if let Err(e) = state
        .ledger
        .validate_direction(request.operation_type_id, request.amount)
    {
        return ledger_error_response(&e);
    }

    match state
        .ledger
        .create_transactions_concurrently(request, state.fan_out_count)
        .await
    {
        Ok(outcome) => {
            info!(
                account_id = %request.account_id,
                created = outcome.ids.len(),
                failed = outcome.failures.len(),
                "Concurrent transactions created"
            );
            if let Some(err) = outcome.partial_failure() {
                warn!(
                    account_id = %request.account_id,
                    error = %err,
                    "Some parallel writes failed"
                );
            }
            (StatusCode::CREATED, Json(fan_out_body(&outcome))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// Body for a fan-out with at least one commit. `first_error` carries the
/// code of the earliest failed branch, or null when every branch committed.
fn fan_out_body(outcome: &FanOutOutcome) -> Value {
    let first_error = outcome.failures.first().map(LedgerError::error_code);

    json!({
        "created": outcome.ids.len(),
        "ids": outcome.ids,
        "failed": outcome.failures.len(),
        "first_error": first_error,
    })
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let Ok(transaction_id) = transaction_id.parse::<TransactionId>() else {
        return bad_request("Invalid transaction ID");
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.get_transaction(transaction_id).await {
        Ok(Some(row)) => Json(TransactionResponse {
            id: row.id,
            account_id: row.account_id,
            operation_type_id: row.operation_type_id,
            amount: row.amount.normalize().to_string(),
            balance: row.balance.normalize().to_string(),
            event_at: row.event_at,
        })
        .into_response(),
        Ok(None) => app_error_response(&AppError::NotFound(format!(
            "Transaction not found: {transaction_id}"
        ))),
        Err(e) => app_error_response(&AppError::Database(e.to_string())),
    }
}
