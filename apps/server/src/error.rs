//! API error envelope.
//!
//! ## Error Flow
//! ```text
//! ValidationError / DbError
//!      │ From impls
//!      ▼
//! ApiError { code, message }  ← serialized as the JSON response body
//!      │ IntoResponse
//!      ▼
//! HTTP status + {"code": "...", "message": "..."}
//! ```
//!
//! Internal detail (SQL text, pool state) is logged server-side and never
//! leaks into a response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use caja_core::ValidationError;
use caja_db::DbError;

/// Machine-readable error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    Conflict,
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::BAD_REQUEST,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON error envelope every non-2xx response carries.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationError, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            other => {
                error!(error = %other, "Database error");
                ApiError::new(ErrorCode::Internal, "Internal server error")
            }
        }
    }
}

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found: ApiError = DbError::not_found("Sale", "x").into();
        assert_eq!(not_found.code, ErrorCode::NotFound);

        let stock: ApiError = DbError::InsufficientStock {
            name: "Yerba".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(stock.code, ErrorCode::InsufficientStock);
        assert_eq!(stock.code.status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = DbError::PoolExhausted.into();
        assert_eq!(internal.code, ErrorCode::Internal);
        assert_eq!(internal.message, "Internal server error");
    }
}
