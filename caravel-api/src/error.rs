use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use caravel_booking::CheckoutError;
use caravel_core::supplier::SupplierError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// Rate or session that existed once but is gone now.
    GoneError(String),
    PaymentError(String),
    /// The supplier was unreachable or answered nonsense.
    UpstreamError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::GoneError(msg) => (StatusCode::GONE, msg),
            AppError::PaymentError(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream supplier error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Supplier temporarily unavailable".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

/// Maps supplier failures onto HTTP semantics. `RateNotFound` is the guest's
/// rate going stale, not an outage.
pub fn supplier_error(err: SupplierError) -> AppError {
    match err {
        SupplierError::RateNotFound => {
            AppError::GoneError("The selected rate has expired".to_string())
        }
        SupplierError::Api(msg) => AppError::UpstreamError(msg),
        SupplierError::Transport(msg) => AppError::UpstreamError(msg),
        SupplierError::Decode(msg) => AppError::UpstreamError(msg),
    }
}

pub fn checkout_error(err: CheckoutError) -> AppError {
    match err {
        CheckoutError::Validation(e) => AppError::ValidationError(e.to_string()),
        CheckoutError::PaymentDeclined(msg) => AppError::PaymentError(msg),
        CheckoutError::PaymentFailed(msg) => AppError::PaymentError(msg),
        CheckoutError::NotSubmittable(state) => {
            AppError::ConflictError(format!("booking cannot be submitted from state {:?}", state))
        }
        CheckoutError::Supplier(e) => supplier_error(e),
    }
}
