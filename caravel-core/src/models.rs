use caravel_shared::pii::Masked;
use serde::{Deserialize, Serialize};

/// Destination suggestion kind as reported by the supplier's autocomplete.
///
/// Region identifiers and hotel identifiers live in different namespaces, so the
/// kind is what tells a caller which lookup an id is valid for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SuggestionKind {
    City,
    Region,
    Hotel,
    #[serde(other)]
    Other,
}

/// A single region or hotel suggestion for a free-text destination query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
}

impl Suggestion {
    pub fn is_hotel(&self) -> bool {
        self.kind == SuggestionKind::Hotel
    }
}

/// Per-room occupancy in the shape the supplier's search endpoint requires.
///
/// Child ages are never itemized by this flow; the array is sent empty even when
/// a child count was captured upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub adults: u32,
    #[serde(default)]
    pub children: Vec<u8>,
}

impl RoomOccupancy {
    pub fn adults_only(adults: u32) -> Self {
        Self {
            adults,
            children: Vec::new(),
        }
    }
}

/// One priced hotel from the supplier's search response. Carries availability and
/// pricing only; descriptive content comes from `HotelInfo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelSearchHit {
    pub id: String,
    #[serde(default)]
    pub hid: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub best_offer: Option<String>,
    #[serde(default)]
    pub total_rates: Option<u32>,
}

/// Descriptive hotel content from the supplier's info endpoint. Long-lived and
/// safe to memoize, unlike search results which are tied to a search session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub star_rating: Option<u8>,
    #[serde(default)]
    pub review_score: Option<f32>,
    #[serde(default)]
    pub reviews_count: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub check_in_time: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A bookable rate for a specific room/meal combination. The `book_hash` is the
/// opaque, time-limited token that starts a booking session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRate {
    #[serde(default)]
    pub book_hash: Option<String>,
    #[serde(default)]
    pub match_hash: Option<String>,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub meal: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_types: Vec<PaymentTypeOption>,
}

/// Payment type accepted by the supplier for a rate or booking form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentTypeOption {
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// How the guest's money reaches the supplier. This flow charges the guest
/// directly and settles with the supplier out-of-band (`Deposit`), which keeps
/// 3-D Secure challenges out of the booking pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Deposit,
    Now,
    #[serde(other)]
    Other,
}

/// Payment block submitted with a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentDetails {
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub amount: f64,
    pub currency: String,
}

/// A guest occupying a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_child: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
}

impl Guest {
    pub fn adult(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_child: false,
            age: None,
        }
    }
}

/// Contact details for the lead guest. Email and phone are masked in Debug
/// output; the real values still reach the supplier on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactDetails {
    pub email: Masked<String>,
    pub phone: Masked<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ContactDetails {
    pub fn new(email: &str, phone: &str) -> Self {
        Self {
            email: Masked::new(email.to_string()),
            phone: Masked::new(phone.to_string()),
            comment: None,
        }
    }
}

/// An amount in a specific currency, as reported by the supplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}
