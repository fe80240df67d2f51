//! Request/response shapes for the supplier proxy, matching its JSON contract.
//! The gateway owns the mapping between these and the domain types in
//! `caravel_core`; nothing above the gateway sees wire shapes.

use caravel_core::models::{ContactDetails, Guest, PaymentDetails, RoomOccupancy, Suggestion};
use caravel_core::models::{HotelInfo, HotelSearchHit, RoomRate};
use caravel_core::supplier::{BookingForm, BookingStatusData, CancellationOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request bodies (language/residency injected from gateway config)
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct AutocompleteBody<'a> {
    pub query: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub region_id: &'a str,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: &'a [RoomOccupancy],
    pub currency: &'a str,
    pub language: &'a str,
    pub residency: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct InfoBody<'a> {
    pub id: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RatesBody<'a> {
    pub id: &'a str,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: &'a [RoomOccupancy],
    pub currency: &'a str,
    pub language: &'a str,
    pub residency: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FormBody<'a> {
    pub book_hash: &'a str,
    pub match_hash: Option<&'a str>,
    pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinishBody<'a> {
    pub partner_order_id: &'a str,
    pub guests: &'a [Guest],
    pub user: &'a ContactDetails,
    pub payment: &'a PaymentDetails,
    pub rooms_count: u32,
    pub stripe_payment_id: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderRefBody<'a> {
    pub partner_order_id: &'a str,
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteResponse {
    pub success: bool,
    #[serde(default)]
    pub regions: Vec<Suggestion>,
    #[serde(default)]
    pub hotels: Vec<Suggestion>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub hotels: Vec<HotelSearchHit>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfoResponse {
    pub success: bool,
    #[serde(default)]
    pub hotel: Option<HotelInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatesResponse {
    pub success: bool,
    #[serde(default)]
    pub rates: Vec<RoomRate>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BookingForm>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinishResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BookingStatusData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<CancellationOutcome>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravel_core::models::PaymentKind;

    #[test]
    fn test_finish_body_wire_field_names() {
        let guests = vec![Guest::adult("Ana", "Silva")];
        let contact = ContactDetails::new("ana@example.com", "+351915550100");
        let payment = PaymentDetails {
            kind: PaymentKind::Deposit,
            amount: 180.0,
            currency: "EUR".to_string(),
        };
        let body = FinishBody {
            partner_order_id: "po-1020",
            guests: &guests,
            user: &contact,
            payment: &payment,
            rooms_count: 1,
            stripe_payment_id: "pay_9f31",
            language: "en",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stripe_payment_id"], "pay_9f31");
        assert_eq!(json["user"]["email"], "ana@example.com");
        assert_eq!(json["payment"]["type"], "deposit");
        assert_eq!(json["guests"][0]["first_name"], "Ana");
    }

    #[test]
    fn test_search_response_tolerates_missing_hotels() {
        let response: SearchResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.hotels.is_empty());
    }

    #[test]
    fn test_cancel_response_shape() {
        let json = r#"{
            "success": true,
            "data": {
                "refunded": {"amount": 120.0, "currency": "USD"},
                "cancellation_fee": {"amount": 30.0, "currency": "USD"}
            },
            "message": "Cancellation processed"
        }"#;
        let response: CancelResponse = serde_json::from_str(json).unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.refunded.unwrap().amount, 120.0);
        assert_eq!(data.cancellation_fee.unwrap().currency, "USD");
    }
}
