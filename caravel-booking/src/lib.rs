//! Booking session lifecycle: supplier-side session creation, guest/payment
//! submission, and bounded status polling to a terminal outcome.

pub mod checkout;
pub mod record;
pub mod scheduler;
pub mod session;

pub use checkout::{
    validate_submission, CheckoutError, CheckoutOrchestrator, CheckoutSubmission, ValidationError,
};
pub use record::{BookingRecord, RecordStatus};
pub use scheduler::{InstantScheduler, Scheduler, TokioScheduler};
pub use session::{evaluate_poll, BookingSession, PollPolicy, PollTransition, SessionState};
