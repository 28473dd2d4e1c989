//! HTTP tests for the account and transaction routes.
//!
//! Drives the full router against in-memory SQLite.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ledgerline_api::{AppState, create_router};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_shared::config::LedgerConfig;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let ledger = LedgerConfig {
        backoff_base_ms: 1,
        fan_out_max_jitter_ms: 5,
        ..LedgerConfig::default()
    };
    create_router(AppState::new(db, &ledger))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_account(app: &Router, document_number: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/accounts",
        Some(json!({ "document_number": document_number })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_transaction(app: &Router, body: Value) -> (StatusCode, Value) {
    send(app, "POST", "/api/v1/transactions", Some(body)).await
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_end_to_end_debit_then_credit() {
    let app = app().await;
    let account_id = create_account(&app, "123456789").await;

    let (status, debit) = create_transaction(
        &app,
        json!({ "account_id": account_id, "operation_type_id": 1, "amount": -50.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let debit_id = debit["id"].as_i64().unwrap();

    let (_, stored) = send(&app, "GET", &format!("/api/v1/transactions/{debit_id}"), None).await;
    assert_eq!(stored["balance"], "-50");

    let (status, credit) = create_transaction(
        &app,
        json!({ "account_id": account_id, "operation_type_id": 4, "amount": 100.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let credit_id = credit["id"].as_i64().unwrap();

    let (_, debit_row) = send(&app, "GET", &format!("/api/v1/transactions/{debit_id}"), None).await;
    let (_, credit_row) =
        send(&app, "GET", &format!("/api/v1/transactions/{credit_id}"), None).await;
    assert_eq!(debit_row["balance"], "0");
    assert_eq!(credit_row["balance"], "50");
    assert_eq!(credit_row["amount"], "100");

    let (status, account) =
        send(&app, "GET", &format!("/api/v1/accounts/{account_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["document_number"], "123456789");
    assert_eq!(account["balance"], "50");
}

#[tokio::test]
async fn test_duplicate_account_conflicts() {
    let app = app().await;
    create_account(&app, "777").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({ "document_number": "777" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_document_number() {
    let app = app().await;
    for body in [json!({ "document_number": "abc" }), json!({})] {
        let (status, _) = send(&app, "POST", "/api/v1/accounts", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_missing_account_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/api/v1/accounts/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = create_transaction(
        &app,
        json!({ "account_id": 99, "operation_type_id": 1, "amount": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_validation_errors() {
    let app = app().await;
    let account_id = create_account(&app, "42").await;

    let (status, body) = create_transaction(
        &app,
        json!({ "account_id": account_id, "operation_type_id": 4, "amount": -10 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DIRECTION_MISMATCH");

    let (status, body) = create_transaction(
        &app,
        json!({ "account_id": account_id, "operation_type_id": 9, "amount": -10 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "UNKNOWN_OPERATION_TYPE");

    let (status, _) = create_transaction(
        &app,
        json!({ "account_id": account_id, "operation_type_id": 1, "amount": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_transaction_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/api/v1/transactions/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/v1/transactions/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_endpoint_fans_out() {
    let app = app().await;
    let account_id = create_account(&app, "9001").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions/concurrent",
        Some(json!({ "account_id": account_id, "operation_type_id": 4, "amount": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created = body["created"].as_u64().unwrap();
    let failed = body["failed"].as_u64().unwrap();
    assert_eq!(created + failed, 10);

    let mut ids: Vec<i64> = body["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len() as u64, created);
}

#[tokio::test]
async fn test_concurrent_endpoint_rejects_bad_direction() {
    let app = app().await;
    let account_id = create_account(&app, "9002").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions/concurrent",
        Some(json!({ "account_id": account_id, "operation_type_id": 1, "amount": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DIRECTION_MISMATCH");
}

#[tokio::test]
async fn test_amounts_outside_store_precision_are_rejected() {
    let app = app().await;
    let account_id = create_account(&app, "31337").await;

    for amount in [json!(-10.12345), json!(-10_000_000_000_000_i64)] {
        let (status, body) = create_transaction(
            &app,
            json!({ "account_id": account_id, "operation_type_id": 1, "amount": amount }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
