use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use caravel_booking::{BookingRecord, RecordStatus};
use caravel_core::models::Money;

use crate::error::{supplier_error, AppError};
use crate::state::{read_store, write_store, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    pub partner_order_id: String,
    pub status: RecordStatus,
    pub refunded: Option<Money>,
    pub cancellation_fee: Option<Money>,
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{partner_order_id}", get(get_booking))
        .route(
            "/v1/bookings/{partner_order_id}/cancel",
            post(cancel_booking),
        )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/bookings/{partner_order_id}
async fn get_booking(
    State(state): State<AppState>,
    Path(partner_order_id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    read_store(&state.records)
        .get(&partner_order_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("booking not found".to_string()))
}

/// POST /v1/bookings/{partner_order_id}/cancel
/// Cancels a confirmed booking with the supplier and marks the stored record.
async fn cancel_booking(
    State(state): State<AppState>,
    Path(partner_order_id): Path<String>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    // Flip to cancelling under the write lock so only one caller reaches the
    // supplier; overlapping cancels conflict instead of double-cancelling.
    {
        let mut records = write_store(&state.records);
        let record = records
            .get_mut(&partner_order_id)
            .ok_or_else(|| AppError::NotFoundError("booking not found".to_string()))?;
        if record.status != RecordStatus::Confirmed {
            return Err(AppError::ConflictError(format!(
                "only confirmed bookings can be cancelled, this one is {:?}",
                record.status
            )));
        }
        record.status = RecordStatus::Cancelling;
    }

    let outcome = match state.checkout.cancel(&partner_order_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // The supplier still holds the booking; put the record back.
            if let Some(record) = write_store(&state.records).get_mut(&partner_order_id) {
                record.status = RecordStatus::Confirmed;
            }
            return Err(supplier_error(e));
        }
    };

    {
        let mut records = write_store(&state.records);
        if let Some(record) = records.get_mut(&partner_order_id) {
            record.status = RecordStatus::Cancelled;
            record.status_note = outcome.message.clone();
        }
    }

    Ok(Json(CancelBookingResponse {
        partner_order_id,
        status: RecordStatus::Cancelled,
        refunded: outcome.refunded,
        cancellation_fee: outcome.cancellation_fee,
        message: outcome.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use caravel_core::models::{ContactDetails, Guest};
    use caravel_core::supplier::{CancellationOutcome, SupplierError};

    use crate::test_support::{test_state, FakeGateway};

    fn record(partner_order_id: &str, status: RecordStatus) -> BookingRecord {
        BookingRecord {
            id: Uuid::new_v4().to_string(),
            partner_order_id: partner_order_id.to_string(),
            order_id: Some(991),
            payment_reference: "pay_test_1".to_string(),
            guests: vec![Guest::adult("Iris", "Blom")],
            contact: ContactDetails::new("iris@example.com", "+3161111111"),
            total_price: 300.0,
            currency: "EUR".to_string(),
            rooms_count: 1,
            status,
            status_note: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cancel_marks_record_cancelled() {
        let gateway = Arc::new(FakeGateway::new().with_cancel(Ok(CancellationOutcome {
            refunded: Some(Money {
                amount: 300.0,
                currency: "EUR".to_string(),
            }),
            cancellation_fee: None,
            message: Some("Cancellation processed".to_string()),
        })));
        let state = test_state(gateway);
        write_store(&state.records).insert(
            "po-cx-1".to_string(),
            record("po-cx-1", RecordStatus::Confirmed),
        );

        let Json(response) = cancel_booking(State(state.clone()), Path("po-cx-1".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status, RecordStatus::Cancelled);
        assert_eq!(response.refunded.unwrap().amount, 300.0);

        let records = read_store(&state.records);
        let stored = records.get("po-cx-1").unwrap();
        assert_eq!(stored.status, RecordStatus::Cancelled);
        assert_eq!(stored.status_note.as_deref(), Some("Cancellation processed"));
    }

    #[tokio::test]
    async fn test_concurrent_cancels_reach_supplier_once() {
        let gateway = Arc::new(FakeGateway::new().with_cancel(Ok(CancellationOutcome {
            refunded: None,
            cancellation_fee: None,
            message: Some("Cancellation processed".to_string()),
        })));
        let state = test_state(gateway.clone());
        write_store(&state.records).insert(
            "po-cx-3".to_string(),
            record("po-cx-3", RecordStatus::Confirmed),
        );

        let (first, second) = tokio::join!(
            cancel_booking(State(state.clone()), Path("po-cx-3".to_string())),
            cancel_booking(State(state.clone()), Path("po-cx-3".to_string())),
        );

        assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 1);
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::ConflictError(_)))));
        assert_eq!(
            read_store(&state.records).get("po-cx-3").unwrap().status,
            RecordStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_failed_supplier_cancel_restores_confirmed() {
        let gateway = Arc::new(FakeGateway::new().with_cancel(Err(SupplierError::Transport(
            "cancel endpoint timeout".to_string(),
        ))));
        let state = test_state(gateway);
        write_store(&state.records).insert(
            "po-cx-4".to_string(),
            record("po-cx-4", RecordStatus::Confirmed),
        );

        let result = cancel_booking(State(state.clone()), Path("po-cx-4".to_string())).await;

        assert!(matches!(result, Err(AppError::UpstreamError(_))));
        assert_eq!(
            read_store(&state.records).get("po-cx-4").unwrap().status,
            RecordStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_cancel_rejects_non_confirmed_booking() {
        let state = test_state(Arc::new(FakeGateway::new()));
        write_store(&state.records).insert(
            "po-cx-2".to_string(),
            record("po-cx-2", RecordStatus::Failed),
        );

        let result = cancel_booking(State(state), Path("po-cx-2".to_string())).await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));
    }

    #[tokio::test]
    async fn test_cancel_unknown_booking_is_not_found() {
        let state = test_state(Arc::new(FakeGateway::new()));
        let result = cancel_booking(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFoundError(_))));
    }
}
