//! The durable booking record handed back to the caller once checkout
//! resolves. Persistence is the caller's concern; this crate only shapes the
//! data.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use caravel_core::models::{ContactDetails, Guest};

use crate::checkout::CheckoutSubmission;
use crate::session::{BookingSession, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Confirmed,
    Failed,
    /// Payment was captured but the booking never existed supplier-side.
    /// Needs manual reconciliation with the supplier.
    PendingReview,
    /// A cancellation is in flight with the supplier. Reverts to confirmed
    /// if the supplier call fails.
    Cancelling,
    /// Confirmed booking later cancelled with the supplier.
    Cancelled,
}

/// Final outcome of one checkout, ready for the caller to persist.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRecord {
    pub id: String,
    pub partner_order_id: String,
    pub order_id: Option<i64>,
    pub payment_reference: String,
    pub guests: Vec<Guest>,
    pub contact: ContactDetails,
    pub total_price: f64,
    pub currency: String,
    pub rooms_count: u32,
    pub status: RecordStatus,
    pub status_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Builds the record for a session that reached a terminal state.
    pub fn from_session(
        session: &BookingSession,
        submission: &CheckoutSubmission,
        payment_reference: &str,
    ) -> Self {
        let (status, status_note) = match session.state {
            SessionState::Confirmed if session.assumed_confirmed => (
                RecordStatus::Confirmed,
                Some("Confirmed by poll-budget policy without an observed supplier ok.".to_string()),
            ),
            SessionState::Confirmed => (RecordStatus::Confirmed, None),
            _ => (RecordStatus::Failed, session.failure_message.clone()),
        };

        Self::build(session, submission, payment_reference, status, status_note)
    }

    /// Builds the degraded record for a checkout whose supplier session could
    /// not be created but whose payment was still captured.
    pub fn local_only(
        session: &BookingSession,
        submission: &CheckoutSubmission,
        payment_reference: &str,
    ) -> Self {
        Self::build(
            session,
            submission,
            payment_reference,
            RecordStatus::PendingReview,
            Some("Supplier session unavailable; booked in local-only mode.".to_string()),
        )
    }

    fn build(
        session: &BookingSession,
        submission: &CheckoutSubmission,
        payment_reference: &str,
        status: RecordStatus,
        status_note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            partner_order_id: session.partner_order_id.clone(),
            order_id: session.order_id,
            payment_reference: payment_reference.to_string(),
            guests: submission.guests.clone(),
            contact: submission.contact.clone(),
            total_price: submission.amount,
            currency: submission.currency.clone(),
            rooms_count: submission.rooms_count,
            status,
            status_note,
            created_at: Utc::now(),
        }
    }
}
