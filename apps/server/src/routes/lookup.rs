//! Lookup-table routes: movement/expense categories and payment methods.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use caja_core::validation::validate_name;
use caja_core::{MovementCategory, PaymentMethod};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", axum::routing::delete(delete_category))
        .route(
            "/payment-methods",
            get(list_payment_methods).post(create_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            axum::routing::delete(delete_payment_method),
        )
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LookupDto {
    pub id: String,
    pub name: String,
}

impl From<MovementCategory> for LookupDto {
    fn from(category: MovementCategory) -> LookupDto {
        LookupDto {
            id: category.id,
            name: category.name,
        }
    }
}

impl From<PaymentMethod> for LookupDto {
    fn from(method: PaymentMethod) -> LookupDto {
        LookupDto {
            id: method.id,
            name: method.name,
        }
    }
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<LookupDto>)> {
    validate_name(&req.name)?;
    let category = state.db.lookups().create_category(req.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(LookupDto::from(category))))
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<LookupDto>>> {
    let categories = state.db.lookups().list_categories().await?;
    Ok(Json(categories.into_iter().map(LookupDto::from).collect()))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.lookups().delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_payment_method(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<LookupDto>)> {
    validate_name(&req.name)?;
    let method = state
        .db
        .lookups()
        .create_payment_method(req.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(LookupDto::from(method))))
}

async fn list_payment_methods(State(state): State<AppState>) -> ApiResult<Json<Vec<LookupDto>>> {
    let methods = state.db.lookups().list_payment_methods().await?;
    Ok(Json(methods.into_iter().map(LookupDto::from).collect()))
}

async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.lookups().delete_payment_method(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
