//! Expense routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_core::validation::{validate_name, validate_positive_amount};
use caja_core::Expense;
use caja_db::NewExpense;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            axum::routing::put(update_expense).delete(delete_expense),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    pub id: String,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount_cents: i64,
}

impl From<Expense> for ExpenseDto {
    fn from(expense: Expense) -> ExpenseDto {
        ExpenseDto {
            id: expense.id,
            account_id: expense.account_id,
            category_id: expense.category_id,
            date: expense.date,
            description: expense.description,
            amount_cents: expense.amount_cents,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub description: String,
    pub amount_cents: i64,
}

impl From<ExpenseRequest> for NewExpense {
    fn from(req: ExpenseRequest) -> NewExpense {
        NewExpense {
            account_id: req.account_id,
            category_id: req.category_id,
            description: req.description,
            amount_cents: req.amount_cents,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseDto>)> {
    validate_name(&req.description)?;
    validate_positive_amount("amountCents", req.amount_cents)?;
    let expense = state.db.expenses().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ExpenseDto::from(expense))))
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> ApiResult<Json<Vec<ExpenseDto>>> {
    let expenses = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => state.db.expenses().list_in_range(start, end).await?,
        _ => state.db.expenses().list().await?,
    };
    Ok(Json(expenses.into_iter().map(ExpenseDto::from).collect()))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<StatusCode> {
    validate_name(&req.description)?;
    validate_positive_amount("amountCents", req.amount_cents)?;
    state.db.expenses().update(&id, req.into()).await?;
    Ok(StatusCode::OK)
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.expenses().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
