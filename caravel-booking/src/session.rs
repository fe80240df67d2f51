//! The booking session entity and its state machine.
//!
//! A session is created against the supplier as soon as the guest reaches
//! checkout with a rate hash, so an expired rate surfaces before payment.
//! After submission the supplier confirms asynchronously; the session is
//! driven by status polls until it lands in a terminal state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use caravel_core::models::PaymentTypeOption;
use caravel_core::supplier::{
    BookingForm, BookingStatusData, SupplierBookingStatus, SupplierError,
};

/// Shown when the supplier demands a 3-D Secure challenge. Deposit payments
/// are supposed to never trigger one, so this is a configuration mismatch
/// that manual support has to untangle, not something to retry.
pub const PAYMENT_VERIFICATION_MESSAGE: &str =
    "Payment verification required. Please contact support to complete this booking.";

/// Lifecycle states of a booking session.
///
/// `FormError` is absorbing for the supplier flow: the session can never be
/// submitted, but checkout may still capture payment and record the booking
/// locally for manual follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    FormCreated,
    FormError,
    Processing,
    Confirmed,
    Failed,
}

impl SessionState {
    /// Terminal states stop the poll loop; nothing transitions out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Confirmed | SessionState::Failed)
    }

    /// Only a freshly created form accepts a guest/payment submission.
    pub fn can_submit(&self) -> bool {
        matches!(self, SessionState::FormCreated)
    }
}

/// Poll cadence and budget for driving a submitted session to a terminal
/// state. Defaults give the supplier a two minute window.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 24,
        }
    }
}

/// One guest checkout's supplier-side booking session.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSession {
    /// Correlation id for every supplier call on this booking. Assigned by
    /// the supplier on session creation; locally generated (`local-` prefix)
    /// when creation failed and only a degraded record can exist.
    pub partner_order_id: String,
    pub order_id: Option<i64>,
    pub book_hash: String,
    pub state: SessionState,
    pub payment_types: Vec<PaymentTypeOption>,
    pub poll_attempts: u32,
    pub progress_percent: Option<u8>,
    /// Set when the poll budget ran out and the session was resolved as
    /// confirmed on supplier guidance rather than an observed `ok`.
    pub assumed_confirmed: bool,
    /// True when session creation failed because the rate expired, which is
    /// routine staleness rather than a fault.
    pub rate_expired: bool,
    pub failure_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingSession {
    /// Transition: uninitialized → form_created.
    pub fn form_created(book_hash: &str, form: &BookingForm) -> Self {
        let now = Utc::now();
        Self {
            partner_order_id: form.partner_order_id.clone(),
            order_id: Some(form.order_id),
            book_hash: book_hash.to_string(),
            state: SessionState::FormCreated,
            payment_types: form.payment_types.clone(),
            poll_attempts: 0,
            progress_percent: None,
            assumed_confirmed: false,
            rate_expired: false,
            failure_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition: uninitialized → form_error. The supplier never assigned a
    /// correlation id, so one is generated locally to key the degraded record.
    pub fn form_error(book_hash: &str, message: &str, rate_expired: bool) -> Self {
        let now = Utc::now();
        Self {
            partner_order_id: format!("local-{}", Uuid::new_v4().simple()),
            order_id: None,
            book_hash: book_hash.to_string(),
            state: SessionState::FormError,
            payment_types: Vec::new(),
            poll_attempts: 0,
            progress_percent: None,
            assumed_confirmed: false,
            rate_expired,
            failure_message: Some(message.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Human-readable state name, as serialized.
    pub fn state_name(&self) -> &'static str {
        match self.state {
            SessionState::FormCreated => "form_created",
            SessionState::FormError => "form_error",
            SessionState::Processing => "processing",
            SessionState::Confirmed => "confirmed",
            SessionState::Failed => "failed",
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// What one status-poll reply means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTransition {
    /// Not terminal yet; poll again while budget remains.
    Stay,
    /// Transition: processing → confirmed.
    Confirm,
    /// Transition: processing → failed, with the message to surface.
    Fail(String),
}

/// Pure mapping from a status-poll reply to the session's next move. The
/// outer loop owns attempts and delays; this function owns the policy of what
/// each supplier status means.
///
/// Poll failures (timeouts, 5xx that outlived the gateway's retries) are
/// retryable: the booking may well be progressing even when a status check
/// cannot reach the supplier.
pub fn evaluate_poll(reply: &Result<BookingStatusData, SupplierError>) -> PollTransition {
    match reply {
        Ok(data) => match data.status {
            SupplierBookingStatus::Ok => PollTransition::Confirm,
            SupplierBookingStatus::Error => PollTransition::Fail(
                data.error
                    .clone()
                    .unwrap_or_else(|| "The supplier reported the booking as failed.".to_string()),
            ),
            SupplierBookingStatus::ThreeDs => {
                PollTransition::Fail(PAYMENT_VERIFICATION_MESSAGE.to_string())
            }
            SupplierBookingStatus::Processing | SupplierBookingStatus::Unknown => {
                PollTransition::Stay
            }
        },
        Err(_) => PollTransition::Stay,
    }
}
