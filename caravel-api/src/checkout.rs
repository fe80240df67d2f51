use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;

use caravel_booking::{
    validate_submission, BookingRecord, BookingSession, CheckoutSubmission, SessionState,
};
use caravel_shared::BookingStatusEvent;

use crate::error::{checkout_error, AppError};
use crate::state::{read_store, write_store, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub book_hash: String,
    #[serde(default)]
    pub match_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub partner_order_id: String,
    pub state: SessionState,
    /// True when the booking record already exists; false while supplier
    /// confirmation is still being polled in the background.
    pub record_ready: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkout/session", post(create_checkout_session))
        .route("/v1/checkout/{partner_order_id}", get(get_checkout_session))
        .route(
            "/v1/checkout/{partner_order_id}/submit",
            post(submit_booking),
        )
        .route(
            "/v1/checkout/{partner_order_id}/events",
            get(checkout_events),
        )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/checkout/session
/// Opens a supplier booking session for a selected rate. Always answers with
/// a session: an expired rate lands in `form_error` so the storefront can
/// offer a fresh search instead of surfacing an error page.
async fn create_checkout_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Json<BookingSession> {
    let session = state
        .checkout
        .create_session(&req.book_hash, req.match_hash.as_deref())
        .await;

    write_store(&state.sessions).insert(session.partner_order_id.clone(), session.clone());
    Json(session)
}

/// GET /v1/checkout/{partner_order_id}
async fn get_checkout_session(
    State(state): State<AppState>,
    Path(partner_order_id): Path<String>,
) -> Result<Json<BookingSession>, AppError> {
    read_store(&state.sessions)
        .get(&partner_order_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("checkout session not found".to_string()))
}

/// POST /v1/checkout/{partner_order_id}/submit
///
/// Validates the guest details, captures payment, hands the booking to the
/// supplier and spawns the status-poll driver. Answers 202 as soon as the
/// supplier accepts; progress streams over `/events` and the final record
/// lands in the bookings store. The degraded (no supplier session) and
/// rejected-submission paths have nothing to poll, so those answer 200 with
/// the record already stored.
async fn submit_booking(
    State(state): State<AppState>,
    Path(partner_order_id): Path<String>,
    Json(submission): Json<CheckoutSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    // 1. Local validation before any money or network is touched.
    validate_submission(&submission).map_err(|e| AppError::ValidationError(e.to_string()))?;

    if read_store(&state.records).contains_key(&partner_order_id) {
        return Err(AppError::ConflictError(
            "booking already finalized".to_string(),
        ));
    }

    // 2. Reserve the session so a concurrent submit cannot double-charge.
    //    Degraded form_error sessions take the same reservation: their path
    //    still captures payment.
    let mut session = {
        let mut sessions = write_store(&state.sessions);
        let stored = sessions
            .get_mut(&partner_order_id)
            .ok_or_else(|| AppError::NotFoundError("checkout session not found".to_string()))?;

        if stored.state != SessionState::FormError && !stored.state.can_submit() {
            return Err(AppError::ConflictError(format!(
                "booking cannot be submitted from state {:?}",
                stored.state
            )));
        }
        let snapshot = stored.clone();
        stored.state = SessionState::Processing;
        snapshot
    };

    // 3. Degraded path: the supplier session never opened, so capture and
    //    record locally for manual fulfilment. The record is stored before
    //    the reservation is let go, so a late duplicate submit hits the
    //    already-finalized guard. A decline puts the session back so the
    //    guest can retry.
    if session.state == SessionState::FormError {
        let record = match state
            .checkout
            .finalize(&mut session, &submission, |_| {})
            .await
        {
            Ok(record) => record,
            Err(e) => {
                if let Some(stored) = write_store(&state.sessions).get_mut(&partner_order_id) {
                    stored.state = SessionState::FormError;
                }
                return Err(checkout_error(e));
            }
        };

        write_store(&state.records).insert(partner_order_id.clone(), record);
        publish_update(&state, &session);
        return Ok((
            StatusCode::OK,
            Json(SubmitResponse {
                partner_order_id,
                state: session.state,
                record_ready: true,
            }),
        ));
    }

    // 4. Capture payment. A decline releases the reservation so the guest
    //    can retry with another card.
    let payment_reference = match state
        .checkout
        .capture_payment(submission.amount, &submission.currency)
        .await
    {
        Ok(reference) => reference,
        Err(e) => {
            if let Some(stored) = write_store(&state.sessions).get_mut(&partner_order_id) {
                stored.state = SessionState::FormCreated;
            }
            return Err(checkout_error(e));
        }
    };

    // 5. Hand the booking to the supplier. A rejection after capture is
    //    resolved inline as a failed record the support team can reconcile.
    if state
        .checkout
        .submit(&mut session, &submission, &payment_reference)
        .await
        .is_err()
    {
        publish_update(&state, &session);
        let record = BookingRecord::from_session(&session, &submission, &payment_reference);
        write_store(&state.records).insert(partner_order_id.clone(), record);
        return Ok((
            StatusCode::OK,
            Json(SubmitResponse {
                partner_order_id,
                state: session.state,
                record_ready: true,
            }),
        ));
    }

    publish_update(&state, &session);

    let response = SubmitResponse {
        partner_order_id: partner_order_id.clone(),
        state: session.state,
        record_ready: false,
    };

    // 6. Poll supplier status in the background until terminal.
    spawn_poll_driver(state, session, submission, payment_reference);

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /v1/checkout/{partner_order_id}/events
/// Live status updates for one checkout, as server-sent events.
async fn checkout_events(
    State(state): State<AppState>,
    Path(partner_order_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let partner_order_id = partner_order_id.clone();
        async move {
            match result {
                Ok(event) if event.partner_order_id == partner_order_id => Event::default()
                    .event("booking_status")
                    .json_data(&event)
                    .ok()
                    .map(Ok::<_, Infallible>),
                _ => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// ============================================================================
// Poll driver
// ============================================================================

/// Writes the session snapshot back to the store and fans the change out to
/// any subscribed event streams.
fn publish_update(state: &AppState, session: &BookingSession) {
    write_store(&state.sessions).insert(session.partner_order_id.clone(), session.clone());
    let _ = state.events_tx.send(BookingStatusEvent::new(
        &session.partner_order_id,
        session.state_name(),
        session.poll_attempts,
        session.failure_message.clone(),
    ));
}

/// Drives the poll loop on a background task, keeping the stored session
/// fresh on every attempt and depositing the final record once the session
/// reaches a terminal state.
fn spawn_poll_driver(
    state: AppState,
    mut session: BookingSession,
    submission: CheckoutSubmission,
    payment_reference: String,
) {
    tokio::spawn(async move {
        let observer_state = state.clone();
        state
            .checkout
            .poll_to_terminal(&mut session, |s| publish_update(&observer_state, s))
            .await;

        let record = BookingRecord::from_session(&session, &submission, &payment_reference);
        write_store(&state.records).insert(session.partner_order_id.clone(), record);
    });
}
