//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use order_store::StoreError;
use reporting::ReportError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or wrong admin token.
    Unauthorized,
    /// Resource not found.
    NotFound(String),
    /// Lifecycle error from the domain layer.
    Order(OrderError),
    /// Store error surfaced directly (catalog operations).
    Store(StoreError),
    /// Report generation error.
    Report(ReportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "admin token required".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Report(ReportError::Store(err)) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::MissingFields { .. } | OrderError::NoItems => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::AlreadyProcessed { .. } | OrderError::ItemsNotEditable { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrderError::Store(store_err) => {
            tracing::error!(error = %store_err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal storage failure".to_string(),
            )
        }
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::DuplicateItem { .. } => (StatusCode::CONFLICT, err.to_string()),
        StoreError::EmptyItemName => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => {
            tracing::error!(error = %err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal storage failure".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}
