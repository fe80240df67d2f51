pub mod events;
pub mod pii;

pub use events::BookingStatusEvent;
pub use pii::Masked;
