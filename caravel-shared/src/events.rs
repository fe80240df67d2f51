use chrono::{DateTime, Utc};

/// Published on the broadcast channel whenever a checkout session changes status,
/// so the storefront can stream progress without re-polling the API.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingStatusEvent {
    pub partner_order_id: String,
    pub status: String,
    pub poll_attempts: u32,
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl BookingStatusEvent {
    pub fn new(partner_order_id: &str, status: &str, poll_attempts: u32, message: Option<String>) -> Self {
        Self {
            partner_order_id: partner_order_id.to_string(),
            status: status.to_string(),
            poll_attempts,
            message,
            at: Utc::now(),
        }
    }
}
