//! Sale lifecycle routes.
//!
//! ```text
//! POST   /sales                      create pending (cart snapshot)
//! GET    /sales/pending              pending list
//! GET    /sales/history              completed + canceled list
//! PUT    /sales/{id}/complete        finalize: stock decrement + final amount
//! POST   /sales/history/{id}/cancel  revert: restore stock + ledger reversal
//! PUT    /sales/history/{id}         edit final amount / payment method
//! PUT    /sales/history/{id}/tax     apply tax percentage
//! DELETE /sales/pending/{id}         hard delete (correction tool)
//! DELETE /sales/history/{id}         hard delete (correction tool)
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_core::validation::{validate_cart, validate_percentage, validate_reason};
use caja_core::{Sale, SaleItem, SaleStatus};
use caja_db::NewSale;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/pending", get(list_pending))
        .route("/sales/history", get(list_history))
        .route("/sales/{id}/complete", put(complete_sale))
        .route("/sales/history/{id}/cancel", post(cancel_sale))
        .route("/sales/history/{id}", put(edit_sale).delete(delete_history))
        .route("/sales/history/{id}/tax", put(apply_tax))
        .route("/sales/pending/{id}", delete(delete_pending))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDto {
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub purchase_price_cents: i64,
}

impl From<SaleItemDto> for SaleItem {
    fn from(dto: SaleItemDto) -> SaleItem {
        SaleItem {
            product_id: dto.product_id,
            name: dto.name,
            quantity: dto.quantity,
            unit_price_cents: dto.unit_price_cents,
            purchase_price_cents: dto.purchase_price_cents,
        }
    }
}

impl From<SaleItem> for SaleItemDto {
    fn from(item: SaleItem) -> SaleItemDto {
        SaleItemDto {
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            purchase_price_cents: item.purchase_price_cents,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<SaleItemDto>,
    pub subtotal_cents: i64,
    pub discount_bps: u32,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub payment_method: Option<String>,
    pub final_discount_bps: u32,
    pub final_amount_cents: i64,
    pub applied_tax_cents: i64,
    pub cancellation_reason: Option<String>,
}

impl From<Sale> for SaleDto {
    fn from(sale: Sale) -> SaleDto {
        SaleDto {
            id: sale.id,
            date: sale.date,
            items: sale.items.into_iter().map(SaleItemDto::from).collect(),
            subtotal_cents: sale.subtotal_cents,
            discount_bps: sale.discount_bps,
            total_cents: sale.total_cents,
            status: sale.status,
            payment_method: sale.payment_method,
            final_discount_bps: sale.final_discount_bps,
            final_amount_cents: sale.final_amount_cents,
            applied_tax_cents: sale.applied_tax_cents,
            cancellation_reason: sale.cancellation_reason,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub items: Vec<SaleItemDto>,
    pub subtotal_cents: i64,
    /// Cart-level discount as a percentage in [0, 100].
    #[serde(default)]
    pub discount_percentage: f64,
    pub total_cents: i64,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSaleRequest {
    pub payment_method: String,
    /// Discount applied at completion, as a percentage in [0, 100].
    #[serde(default)]
    pub final_discount_percentage: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSaleRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSaleRequest {
    pub final_amount_cents: i64,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTaxRequest {
    pub tax_percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Number of rows removed; 0 means nothing matched the scope.
    pub changes: u64,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_sale(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let items: Vec<SaleItem> = req.items.into_iter().map(SaleItem::from).collect();
    validate_cart(&items)?;
    let discount = validate_percentage("discountPercentage", req.discount_percentage)?;

    let sale = state
        .db
        .sales()
        .create_pending(NewSale {
            items,
            subtotal_cents: req.subtotal_cents,
            discount,
            total_cents: req.total_cents,
            payment_method: req.payment_method,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "saleId": sale.id })),
    ))
}

async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<SaleDto>>> {
    let sales = state.db.sales().list_pending().await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

async fn list_history(State(state): State<AppState>) -> ApiResult<Json<Vec<SaleDto>>> {
    let sales = state.db.sales().list_history().await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

async fn complete_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteSaleRequest>,
) -> ApiResult<Json<SaleDto>> {
    let discount = validate_percentage("finalDiscountPercentage", req.final_discount_percentage)?;
    let sale = state
        .db
        .sales()
        .complete(&id, &req.payment_method, discount)
        .await?;
    Ok(Json(SaleDto::from(sale)))
}

async fn cancel_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CancelSaleRequest>,
) -> ApiResult<Json<SaleDto>> {
    validate_reason(&req.reason)?;
    let sale = state.db.sales().cancel(&id, req.reason.trim()).await?;
    Ok(Json(SaleDto::from(sale)))
}

async fn edit_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditSaleRequest>,
) -> ApiResult<StatusCode> {
    state
        .db
        .sales()
        .edit_completed(&id, req.final_amount_cents, &req.payment_method)
        .await?;
    Ok(StatusCode::OK)
}

async fn apply_tax(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApplyTaxRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let tax = validate_percentage("taxPercentage", req.tax_percentage)?;
    let applied = state.db.sales().apply_tax(&id, tax).await?;
    Ok(Json(serde_json::json!({ "appliedTaxCents": applied })))
}

async fn delete_pending(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let changes = state.db.sales().delete_pending(&id).await?;
    Ok(Json(DeleteResponse { changes }))
}

async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let changes = state.db.sales().delete_history(&id).await?;
    Ok(Json(DeleteResponse { changes }))
}
