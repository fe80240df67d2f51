pub mod models;
pub mod payment;
pub mod supplier;

pub use payment::{PaymentCapture, PaymentOutcome};
pub use supplier::{SupplierError, SupplierGateway};
