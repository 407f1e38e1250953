//! Reporting routes.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_db::{MonthlySummary, TopProduct};

use super::expense::ExpenseDto;
use super::sale::SaleDto;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/reports/monthly-summary", get(monthly_summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Aggregates plus the raw completed sales and expenses of the period.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryDto {
    pub revenue_cents: i64,
    pub cost_of_goods_cents: i64,
    pub gross_profit_cents: i64,
    pub tax_total_cents: i64,
    pub expense_total_cents: i64,
    pub net_profit_cents: i64,
    pub sales_count: i64,
    pub expenses_count: i64,
    pub sales: Vec<SaleDto>,
    pub expenses: Vec<ExpenseDto>,
    pub top_products: Vec<TopProduct>,
}

impl From<MonthlySummary> for MonthlySummaryDto {
    fn from(summary: MonthlySummary) -> MonthlySummaryDto {
        MonthlySummaryDto {
            revenue_cents: summary.revenue_cents,
            cost_of_goods_cents: summary.cost_of_goods_cents,
            gross_profit_cents: summary.gross_profit_cents,
            tax_total_cents: summary.tax_total_cents,
            expense_total_cents: summary.expense_total_cents,
            net_profit_cents: summary.net_profit_cents,
            sales_count: summary.sales_count,
            expenses_count: summary.expenses_count,
            sales: summary.sales.into_iter().map(SaleDto::from).collect(),
            expenses: summary.expenses.into_iter().map(ExpenseDto::from).collect(),
            top_products: summary.top_products,
        }
    }
}

async fn monthly_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<MonthlySummaryDto>> {
    let summary = state
        .db
        .reports()
        .monthly_summary(query.start_date, query.end_date)
        .await?;
    Ok(Json(MonthlySummaryDto::from(summary)))
}
