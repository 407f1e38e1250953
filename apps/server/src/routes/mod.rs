//! Route assembly.
//!
//! One module per resource; this module merges them, wires the shared
//! state and stacks the trace/CORS layers.

pub mod account;
pub mod expense;
pub mod lookup;
pub mod product;
pub mod report;
pub mod sale;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = match &config.cors_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin([origin])
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                warn!(origin = %origin, "Invalid CAJA_CORS_ORIGIN, allowing any origin");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(health))
        .merge(sale::router())
        .merge(product::router())
        .merge(account::router())
        .merge(expense::router())
        .merge(lookup::router())
        .merge(report::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Liveness + database reachability.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded" })),
        )
    }
}
