//! Account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use ledgerline_db::AccountRepository;
use ledgerline_shared::{AppError, types::AccountId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{app_error_response, bad_request};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Customer document number. Digits only.
    pub document_number: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: i64,
    /// Customer document number.
    pub document_number: String,
    /// Net position: sum of all transaction balances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

/// Returns the trimmed document number if it is a valid integer.
fn parse_document_number(raw: Option<&str>) -> Option<&str> {
    let trimmed = raw?.trim();
    trimmed.parse::<i64>().ok().map(|_| trimmed)
}

async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let Some(document_number) = parse_document_number(payload.document_number.as_deref()) else {
        return bad_request("document_number must be a non-empty integer");
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo.create_account(document_number).await {
        Ok(account) => (
            StatusCode::CREATED,
            Json(AccountResponse {
                id: account.id,
                document_number: account.document_number,
                balance: None,
            }),
        )
            .into_response(),
        Err(e) => app_error_response(&AppError::from(e)),
    }
}

async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    let Ok(account_id) = account_id.parse::<AccountId>() else {
        return bad_request("Invalid account ID");
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo.get_account(account_id).await {
        Ok(found) => Json(AccountResponse {
            id: found.account.id,
            document_number: found.account.document_number,
            balance: Some(found.balance.normalize().to_string()),
        })
        .into_response(),
        Err(e) => app_error_response(&AppError::from(e)),
    }
}
