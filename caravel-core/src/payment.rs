use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of charging the guest through the external payment processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "result")]
pub enum PaymentOutcome {
    /// The charge went through; `reference` is the processor's id for it and is
    /// embedded in the supplier submission for reconciliation.
    Approved { reference: String },
    /// The processor declined the charge.
    Declined { message: String },
}

impl PaymentOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentOutcome::Approved { .. })
    }
}

/// Seam to the external payment processor.
///
/// Card entry and tokenization happen outside this system; the booking flow only
/// needs a charge attempted and its outcome reported.
#[async_trait]
pub trait PaymentCapture: Send + Sync {
    async fn capture(
        &self,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct MockPaymentCapture;

#[async_trait]
impl PaymentCapture for MockPaymentCapture {
    async fn capture(
        &self,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentOutcome, Box<dyn std::error::Error + Send + Sync>> {
        if amount <= 0.0 {
            return Ok(PaymentOutcome::Declined {
                message: format!("Invalid charge amount: {} {}", amount, currency),
            });
        }

        tracing::info!("Mock payment capture approved for {} {}", amount, currency);

        Ok(PaymentOutcome::Approved {
            reference: format!("pay_mock_{}", Uuid::new_v4().simple()),
        })
    }
}
