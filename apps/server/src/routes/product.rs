//! Product catalog routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_core::validation::{validate_name, validate_restock_quantity};
use caja_core::{Product, SalePrice};
use caja_db::{NewProduct, ProductUpdate};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/batch", post(create_batch))
        .route("/products/low-stock", get(list_low_stock))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/restock", post(restock_product))
        .route("/products/{id}/stock-entries", get(list_stock_entries))
        .route("/products/{id}/price-increases", get(list_price_increases))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePriceDto {
    pub name: String,
    pub price_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: Option<String>,
    pub name: String,
    pub kind: String,
    pub brand: Option<String>,
    pub subkind: Option<String>,
    pub quantity: i64,
    pub purchase_price_cents: i64,
    pub sale_prices: Vec<SalePriceDto>,
    pub low_stock_threshold: i64,
    pub low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> ProductDto {
        let low_stock = product.is_low_stock();
        ProductDto {
            id: product.id,
            code: product.code,
            name: product.name,
            kind: product.kind,
            brand: product.brand,
            subkind: product.subkind,
            quantity: product.quantity,
            purchase_price_cents: product.purchase_price_cents,
            sale_prices: product
                .sale_prices
                .into_iter()
                .map(|p| SalePriceDto {
                    name: p.name,
                    price_cents: p.price_cents,
                })
                .collect(),
            low_stock_threshold: product.low_stock_threshold,
            low_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Request body shared by create and update (the catalog form submits
/// every field both times).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub code: Option<String>,
    pub name: String,
    pub kind: String,
    pub brand: Option<String>,
    pub subkind: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub purchase_price_cents: i64,
    #[serde(default)]
    pub sale_prices: Vec<SalePriceDto>,
    #[serde(default)]
    pub low_stock_threshold: i64,
}

impl ProductRequest {
    fn sale_prices(&self) -> Vec<SalePrice> {
        self.sale_prices
            .iter()
            .map(|p| SalePrice {
                name: p.name.clone(),
                price_cents: p.price_cents,
            })
            .collect()
    }

    fn into_new(self) -> NewProduct {
        let sale_prices = self.sale_prices();
        NewProduct {
            code: self.code,
            name: self.name,
            kind: self.kind,
            brand: self.brand,
            subkind: self.subkind,
            quantity: self.quantity,
            purchase_price_cents: self.purchase_price_cents,
            sale_prices,
            low_stock_threshold: self.low_stock_threshold,
        }
    }

    fn into_update(self) -> ProductUpdate {
        let sale_prices = self.sale_prices();
        ProductUpdate {
            code: self.code,
            name: self.name,
            kind: self.kind,
            brand: self.brand,
            subkind: self.subkind,
            quantity: self.quantity,
            purchase_price_cents: self.purchase_price_cents,
            sale_prices,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntryDto {
    pub id: String,
    pub product_id: String,
    pub date: DateTime<Utc>,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceIncreaseDto {
    pub id: String,
    pub product_id: String,
    pub date: DateTime<Utc>,
    pub old_price_cents: i64,
    pub new_price_cents: i64,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductDto>)> {
    validate_name(&req.name)?;
    let product = state.db.products().create(req.into_new()).await?;
    Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}

async fn create_batch(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<ProductRequest>>,
) -> ApiResult<(StatusCode, Json<Vec<ProductDto>>)> {
    for req in &reqs {
        validate_name(&req.name)?;
    }

    let new_products = reqs.into_iter().map(ProductRequest::into_new).collect();
    let products = state.db.products().create_batch(new_products).await?;
    Ok((
        StatusCode::CREATED,
        Json(products.into_iter().map(ProductDto::from).collect()),
    ))
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list(query.search.as_deref()).await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

async fn list_low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list_low_stock().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDto>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| caja_db::DbError::not_found("Product", &id))?;
    Ok(Json(ProductDto::from(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<ProductDto>> {
    validate_name(&req.name)?;
    let product = state.db.products().update(&id, req.into_update()).await?;
    Ok(Json(ProductDto::from(product)))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> ApiResult<Json<ProductDto>> {
    validate_restock_quantity(req.quantity)?;
    state
        .db
        .products()
        .restock(&id, req.quantity, req.unit_cost_cents)
        .await?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| caja_db::DbError::not_found("Product", &id))?;
    Ok(Json(ProductDto::from(product)))
}

async fn list_stock_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<StockEntryDto>>> {
    let entries = state.db.products().list_stock_entries(&id).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| StockEntryDto {
                id: e.id,
                product_id: e.product_id,
                date: e.date,
                quantity: e.quantity,
                unit_cost_cents: e.unit_cost_cents,
            })
            .collect(),
    ))
}

async fn list_price_increases(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<PriceIncreaseDto>>> {
    let increases = state.db.products().list_price_increases(&id).await?;
    Ok(Json(
        increases
            .into_iter()
            .map(|p| PriceIncreaseDto {
                id: p.id,
                product_id: p.product_id,
                date: p.date,
                old_price_cents: p.old_price_cents,
                new_price_cents: p.new_price_cents,
            })
            .collect(),
    ))
}
