use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    ContactDetails, Guest, HotelInfo, HotelSearchHit, Money, PaymentDetails, PaymentTypeOption,
    RoomOccupancy, RoomRate, Suggestion,
};

/// Failure modes of a supplier call, after the gateway has normalized the
/// response shape and exhausted its transport retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SupplierError {
    /// The rate hash has expired or was never valid. Rates expire routinely, so
    /// callers treat this as an expected condition, not an outage.
    #[error("rate not found or expired")]
    RateNotFound,

    /// The supplier understood the request and rejected it.
    #[error("supplier rejected request: {0}")]
    Api(String),

    /// Network-level failure (connect error, timeout, 5xx) that survived the
    /// retry budget.
    #[error("supplier unreachable: {0}")]
    Transport(String),

    /// The supplier answered with a body we could not interpret.
    #[error("malformed supplier response: {0}")]
    Decode(String),
}

impl SupplierError {
    /// True when the condition is part of normal operation (expired rates) as
    /// opposed to a real fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, SupplierError::RateNotFound)
    }
}

/// Search request for priced hotel availability within a region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelSearchRequest {
    pub region_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: Vec<RoomOccupancy>,
    pub currency: String,
}

/// Rate listing request for a single hotel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelRatesRequest {
    pub hotel_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: Vec<RoomOccupancy>,
    pub currency: String,
}

/// Opens a booking session for a previously selected rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingFormRequest {
    pub book_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_hash: Option<String>,
}

/// The supplier-side session opened for a rate. `partner_order_id` is the
/// correlation key for every subsequent call on this booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingForm {
    pub order_id: i64,
    pub partner_order_id: String,
    #[serde(default)]
    pub payment_types: Vec<PaymentTypeOption>,
}

/// Guest, contact and payment data attached to an open booking session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingFinishRequest {
    pub partner_order_id: String,
    pub guests: Vec<Guest>,
    pub contact: ContactDetails,
    pub payment: PaymentDetails,
    pub rooms_count: u32,
    /// External payment processor reference, carried for audit/reconciliation.
    pub payment_reference: String,
}

/// Booking status as the supplier reports it while processing asynchronously.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SupplierBookingStatus {
    Ok,
    Error,
    Processing,
    #[serde(rename = "3ds")]
    ThreeDs,
    #[serde(other)]
    Unknown,
}

/// One status-poll response for an in-flight booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingStatusData {
    pub status: SupplierBookingStatus,
    #[serde(default)]
    pub partner_order_id: Option<String>,
    #[serde(default)]
    pub percent: Option<u8>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data_3ds: Option<serde_json::Value>,
}

/// Result of cancelling a confirmed booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancellationOutcome {
    #[serde(default)]
    pub refunded: Option<Money>,
    #[serde(default)]
    pub cancellation_fee: Option<Money>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Transport seam to the hotel supplier's proxy API.
///
/// Implementations own retry-on-transient-failure and response normalization;
/// everything above this trait reasons in domain types and typed errors. Search
/// and booking services take it as `Arc<dyn SupplierGateway>` so tests can
/// substitute scripted fakes.
#[async_trait]
pub trait SupplierGateway: Send + Sync {
    /// Free-text destination lookup. Returns regions and hotels in one list;
    /// callers partition by `Suggestion::kind`.
    async fn autocomplete(&self, query: &str) -> Result<Vec<Suggestion>, SupplierError>;

    /// Priced availability for a region and stay.
    async fn search_hotels(
        &self,
        request: &HotelSearchRequest,
    ) -> Result<Vec<HotelSearchHit>, SupplierError>;

    /// Descriptive content for one hotel.
    async fn hotel_info(&self, hotel_id: &str) -> Result<HotelInfo, SupplierError>;

    /// Bookable rates for one hotel and stay.
    async fn hotel_rates(&self, request: &HotelRatesRequest)
        -> Result<Vec<RoomRate>, SupplierError>;

    /// Opens a booking session for a selected rate. `RateNotFound` here means
    /// the hash expired between rate display and checkout.
    async fn create_booking_form(
        &self,
        request: &BookingFormRequest,
    ) -> Result<BookingForm, SupplierError>;

    /// Submits guests and payment to an open session. Acceptance only means the
    /// supplier started processing, not that the booking is confirmed.
    async fn finish_booking(&self, request: &BookingFinishRequest) -> Result<(), SupplierError>;

    /// Polls processing status for a submitted booking.
    async fn booking_status(
        &self,
        partner_order_id: &str,
    ) -> Result<BookingStatusData, SupplierError>;

    /// Cancels a confirmed booking.
    async fn cancel_booking(
        &self,
        partner_order_id: &str,
    ) -> Result<CancellationOutcome, SupplierError>;
}
