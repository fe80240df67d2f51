//! Checkout orchestration: session creation, local validation, payment
//! capture, supplier submission, and the poll loop that resolves every
//! checkout to a definite answer.

use std::sync::Arc;

use caravel_core::models::{ContactDetails, Guest, PaymentDetails, PaymentKind};
use caravel_core::payment::{PaymentCapture, PaymentOutcome};
use caravel_core::supplier::{
    BookingFinishRequest, BookingFormRequest, CancellationOutcome, SupplierError, SupplierGateway,
};
use serde::{Deserialize, Serialize};

use crate::record::BookingRecord;
use crate::scheduler::Scheduler;
use crate::session::{evaluate_poll, BookingSession, PollPolicy, PollTransition, SessionState};

/// Everything the guest provides at the payment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSubmission {
    pub guests: Vec<Guest>,
    pub contact: ContactDetails,
    pub amount: f64,
    pub currency: String,
    pub rooms_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one guest is required")]
    NoGuests,

    #[error("guest {index}: {field} is required")]
    MissingGuestField { index: usize, field: &'static str },

    #[error("contact {field} is required")]
    MissingContactField { field: &'static str },
}

/// Local gate ahead of any network call: every guest needs a name and the
/// lead contact needs a reachable email and phone.
pub fn validate_submission(submission: &CheckoutSubmission) -> Result<(), ValidationError> {
    if submission.guests.is_empty() {
        return Err(ValidationError::NoGuests);
    }

    for (index, guest) in submission.guests.iter().enumerate() {
        if guest.first_name.trim().is_empty() {
            return Err(ValidationError::MissingGuestField {
                index,
                field: "first name",
            });
        }
        if guest.last_name.trim().is_empty() {
            return Err(ValidationError::MissingGuestField {
                index,
                field: "last name",
            });
        }
    }

    if submission.contact.email.as_inner().trim().is_empty() {
        return Err(ValidationError::MissingContactField { field: "email" });
    }
    if submission.contact.phone.as_inner().trim().is_empty() {
        return Err(ValidationError::MissingContactField { field: "phone" });
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("payment processing failed: {0}")]
    PaymentFailed(String),

    #[error("session cannot be submitted from state {0:?}")]
    NotSubmittable(SessionState),

    #[error(transparent)]
    Supplier(#[from] SupplierError),
}

/// Drives one booking session from rate hash to terminal outcome.
///
/// Collaborators are injected so tests can script the supplier, the payment
/// processor and the clock independently. Exactly one session is driven per
/// orchestrator call; polls for a session are strictly sequential.
pub struct CheckoutOrchestrator {
    gateway: Arc<dyn SupplierGateway>,
    payments: Arc<dyn PaymentCapture>,
    scheduler: Arc<dyn Scheduler>,
    policy: PollPolicy,
}

impl CheckoutOrchestrator {
    pub fn new(
        gateway: Arc<dyn SupplierGateway>,
        payments: Arc<dyn PaymentCapture>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            gateway,
            payments,
            scheduler,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Transition: uninitialized → form_created | form_error.
    ///
    /// Runs as soon as a rate hash is available so staleness surfaces before
    /// the guest pays. Never fails: an expired rate is routine and lands in
    /// `form_error` with a calm message instead of an error return.
    pub async fn create_session(&self, book_hash: &str, match_hash: Option<&str>) -> BookingSession {
        let request = BookingFormRequest {
            book_hash: book_hash.to_string(),
            match_hash: match_hash.map(str::to_string),
        };

        match self.gateway.create_booking_form(&request).await {
            Ok(form) => {
                tracing::info!(
                    partner_order_id = %form.partner_order_id,
                    order_id = form.order_id,
                    "booking session created"
                );
                BookingSession::form_created(book_hash, &form)
            }
            Err(e) if e.is_expected() => {
                tracing::info!("selected rate expired before checkout");
                BookingSession::form_error(
                    book_hash,
                    "The selected rate has expired. Please search again for current prices.",
                    true,
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "booking session creation failed");
                BookingSession::form_error(book_hash, &e.to_string(), false)
            }
        }
    }

    /// Charges the guest through the external processor. A decline leaves the
    /// session untouched so the guest can retry with another method.
    pub async fn capture_payment(&self, amount: f64, currency: &str) -> Result<String, CheckoutError> {
        match self.payments.capture(amount, currency).await {
            Ok(PaymentOutcome::Approved { reference }) => {
                tracing::info!(reference = %reference, "payment captured");
                Ok(reference)
            }
            Ok(PaymentOutcome::Declined { message }) => Err(CheckoutError::PaymentDeclined(message)),
            Err(e) => Err(CheckoutError::PaymentFailed(e.to_string())),
        }
    }

    /// Transition: form_created → processing | failed. Attaches guests,
    /// contact and the captured payment reference to the supplier session.
    /// Acceptance means the supplier started processing, nothing more.
    pub async fn submit(
        &self,
        session: &mut BookingSession,
        submission: &CheckoutSubmission,
        payment_reference: &str,
    ) -> Result<(), CheckoutError> {
        validate_submission(submission)?;
        if !session.state.can_submit() {
            return Err(CheckoutError::NotSubmittable(session.state));
        }

        let request = BookingFinishRequest {
            partner_order_id: session.partner_order_id.clone(),
            guests: submission.guests.clone(),
            contact: submission.contact.clone(),
            payment: PaymentDetails {
                kind: PaymentKind::Deposit,
                amount: submission.amount,
                currency: submission.currency.clone(),
            },
            rooms_count: submission.rooms_count,
            payment_reference: payment_reference.to_string(),
        };

        match self.gateway.finish_booking(&request).await {
            Ok(()) => {
                session.state = SessionState::Processing;
                session.touch();
                tracing::info!(
                    partner_order_id = %session.partner_order_id,
                    "booking submitted, awaiting supplier confirmation"
                );
                Ok(())
            }
            Err(e) => {
                session.state = SessionState::Failed;
                session.failure_message = Some(e.to_string());
                session.touch();
                tracing::error!(
                    partner_order_id = %session.partner_order_id,
                    error = %e,
                    "booking submission rejected"
                );
                Err(CheckoutError::Supplier(e))
            }
        }
    }

    /// Transition: processing → confirmed | failed.
    ///
    /// Sequential status polls one interval apart, never overlapping, until a
    /// terminal status or the budget runs out. Budget exhaustion resolves as
    /// confirmed with `assumed_confirmed` set: supplier guidance is that late
    /// confirmations nearly always land, and checkout must end with an answer.
    pub async fn poll_to_terminal<F>(&self, session: &mut BookingSession, mut on_update: F)
    where
        F: FnMut(&BookingSession) + Send,
    {
        if session.state != SessionState::Processing {
            return;
        }

        for attempt in 1..=self.policy.max_attempts {
            self.scheduler.wait(self.policy.interval).await;

            let reply = self.gateway.booking_status(&session.partner_order_id).await;
            session.poll_attempts = attempt;
            if let Ok(data) = &reply {
                if data.percent.is_some() {
                    session.progress_percent = data.percent;
                }
            }
            session.touch();

            match evaluate_poll(&reply) {
                PollTransition::Confirm => {
                    session.state = SessionState::Confirmed;
                    tracing::info!(
                        partner_order_id = %session.partner_order_id,
                        attempt,
                        "booking confirmed"
                    );
                    on_update(session);
                    return;
                }
                PollTransition::Fail(message) => {
                    session.state = SessionState::Failed;
                    session.failure_message = Some(message);
                    tracing::warn!(
                        partner_order_id = %session.partner_order_id,
                        attempt,
                        failure = session.failure_message.as_deref().unwrap_or_default(),
                        "booking failed"
                    );
                    on_update(session);
                    return;
                }
                PollTransition::Stay => {
                    if let Err(e) = &reply {
                        tracing::warn!(
                            partner_order_id = %session.partner_order_id,
                            attempt,
                            error = %e,
                            "status poll failed, continuing"
                        );
                    }
                    on_update(session);
                }
            }
        }

        tracing::warn!(
            partner_order_id = %session.partner_order_id,
            attempts = self.policy.max_attempts,
            "poll budget exhausted without a terminal status, assuming confirmed"
        );
        session.state = SessionState::Confirmed;
        session.assumed_confirmed = true;
        session.touch();
        on_update(session);
    }

    /// Full checkout for an existing session: validate locally, capture
    /// payment, submit to the supplier, poll to terminal, and shape the
    /// record the caller persists.
    ///
    /// A `form_error` session skips the supplier entirely and yields a
    /// local-only record, so an expired rate never blocks the guest's payment
    /// from being honored. Supplier rejection after capture resolves to a
    /// failed record rather than an error, since the charge already exists
    /// and must be reconciled.
    pub async fn finalize<F>(
        &self,
        session: &mut BookingSession,
        submission: &CheckoutSubmission,
        mut on_update: F,
    ) -> Result<BookingRecord, CheckoutError>
    where
        F: FnMut(&BookingSession) + Send,
    {
        validate_submission(submission)?;

        if session.state != SessionState::FormError && !session.state.can_submit() {
            return Err(CheckoutError::NotSubmittable(session.state));
        }

        let payment_reference = self
            .capture_payment(submission.amount, &submission.currency)
            .await?;

        if session.state == SessionState::FormError {
            tracing::warn!(
                partner_order_id = %session.partner_order_id,
                "supplier session unavailable, recording booking locally for manual follow-up"
            );
            return Ok(BookingRecord::local_only(session, submission, &payment_reference));
        }

        if self.submit(session, submission, &payment_reference).await.is_err() {
            // The charge already went through; resolve to a failed record the
            // caller can reconcile instead of erroring.
            on_update(session);
            return Ok(BookingRecord::from_session(session, submission, &payment_reference));
        }
        on_update(session);

        self.poll_to_terminal(session, &mut on_update).await;

        Ok(BookingRecord::from_session(session, submission, &payment_reference))
    }

    /// Cancels an already-confirmed booking with the supplier.
    pub async fn cancel(&self, partner_order_id: &str) -> Result<CancellationOutcome, SupplierError> {
        let outcome = self.gateway.cancel_booking(partner_order_id).await?;
        tracing::info!(partner_order_id, "booking cancelled");
        Ok(outcome)
    }
}
