//! Account ledger routes.
//!
//! ```text
//! /accounts                 account CRUD
//! /account/summary          period income/outcome + payment-method slices
//! /account/movements        deposit/withdrawal CRUD
//! /account/closings         expected-vs-counted snapshots
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_core::validation::{validate_name, validate_positive_amount, validate_reason};
use caja_core::{Account, AccountKind, AccountMovement, CashClosing, MovementKind};
use caja_db::{AccountSummary, NewMovement};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", axum::routing::delete(delete_account))
        .route("/account/summary", get(summary))
        .route(
            "/account/movements",
            get(list_movements).post(add_movement),
        )
        .route(
            "/account/movements/{id}",
            axum::routing::put(update_movement).delete(delete_movement),
        )
        .route("/account/closings", get(list_closings).post(create_closing))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> AccountDto {
        AccountDto {
            id: account.id,
            name: account.name,
            kind: account.kind,
            initial_balance_cents: account.initial_balance_cents,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub initial_balance_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: String,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub reason: String,
}

impl From<AccountMovement> for MovementDto {
    fn from(movement: AccountMovement) -> MovementDto {
        MovementDto {
            id: movement.id,
            account_id: movement.account_id,
            category_id: movement.category_id,
            date: movement.date,
            kind: movement.kind,
            amount_cents: movement.amount_cents,
            reason: movement.reason,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub reason: String,
}

impl From<MovementRequest> for NewMovement {
    fn from(req: MovementRequest) -> NewMovement {
        NewMovement {
            account_id: req.account_id,
            category_id: req.category_id,
            kind: req.kind,
            amount_cents: req.amount_cents,
            reason: req.reason,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Passing `accountId` switches the income semantics, not just the
    /// scope: sales carry no account reference, so a scoped summary counts
    /// only that account's movements and expenses, and `byPaymentMethod`
    /// comes back empty. Omit it for the consolidated summary with sale
    /// income and the payment-method breakdown.
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingQuery {
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClosingRequest {
    pub account_id: String,
    pub counted_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingDto {
    pub id: String,
    pub account_id: String,
    pub date: DateTime<Utc>,
    pub expected_cents: i64,
    pub counted_cents: i64,
    pub difference_cents: i64,
}

impl From<CashClosing> for ClosingDto {
    fn from(closing: CashClosing) -> ClosingDto {
        ClosingDto {
            id: closing.id,
            account_id: closing.account_id,
            date: closing.date,
            expected_cents: closing.expected_cents,
            counted_cents: closing.counted_cents,
            difference_cents: closing.difference_cents,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountDto>)> {
    validate_name(&req.name)?;
    let account = state
        .db
        .accounts()
        .create(req.name.trim(), req.kind, req.initial_balance_cents)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountDto::from(account))))
}

async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<AccountDto>>> {
    let accounts = state.db.accounts().list().await?;
    Ok(Json(accounts.into_iter().map(AccountDto::from).collect()))
}

async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.accounts().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<AccountSummary>> {
    let summary = state
        .db
        .accounts()
        .summary(query.start_date, query.end_date, query.account_id.as_deref())
        .await?;
    Ok(Json(summary))
}

async fn add_movement(
    State(state): State<AppState>,
    Json(req): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<MovementDto>)> {
    validate_positive_amount("amountCents", req.amount_cents)?;
    validate_reason(&req.reason)?;
    let movement = state.db.accounts().add_movement(req.into()).await?;
    Ok((StatusCode::CREATED, Json(MovementDto::from(movement))))
}

async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> ApiResult<Json<Vec<MovementDto>>> {
    let movements = state
        .db
        .accounts()
        .list_movements(query.account_id.as_deref())
        .await?;
    Ok(Json(movements.into_iter().map(MovementDto::from).collect()))
}

async fn update_movement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MovementRequest>,
) -> ApiResult<StatusCode> {
    validate_positive_amount("amountCents", req.amount_cents)?;
    validate_reason(&req.reason)?;
    state.db.accounts().update_movement(&id, req.into()).await?;
    Ok(StatusCode::OK)
}

async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.accounts().delete_movement(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_closing(
    State(state): State<AppState>,
    Json(req): Json<CreateClosingRequest>,
) -> ApiResult<(StatusCode, Json<ClosingDto>)> {
    let closing = state
        .db
        .accounts()
        .cash_closing(&req.account_id, req.counted_cents)
        .await?;
    Ok((StatusCode::CREATED, Json(ClosingDto::from(closing))))
}

async fn list_closings(
    State(state): State<AppState>,
    Query(query): Query<ClosingQuery>,
) -> ApiResult<Json<Vec<ClosingDto>>> {
    let closings = state.db.accounts().list_closings(&query.account_id).await?;
    Ok(Json(closings.into_iter().map(ClosingDto::from).collect()))
}
