use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use caravel_core::models::{HotelInfo, RoomRate};
use caravel_core::supplier::HotelRatesRequest;
use caravel_search::{distribute_occupancy, AutocompleteResults, HotelOffer, SearchQuery};

use crate::error::{supplier_error, AppError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AutocompleteRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchHotelsRequest {
    pub region_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_rooms() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Serialize)]
pub struct SearchHotelsResponse {
    pub hotels: Vec<HotelOffer>,
}

#[derive(Debug, Deserialize)]
pub struct HotelRatesBody {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct HotelRatesResponse {
    pub rates: Vec<RoomRate>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/hotels/autocomplete", post(autocomplete))
        .route("/v1/hotels/search", post(search_hotels))
        .route("/v1/hotels/{id}", get(hotel_info))
        .route("/v1/hotels/{id}/rates", post(hotel_rates))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/hotels/autocomplete
/// Destination suggestions for the search box. Never errors: short queries
/// get the popular-destinations set and supplier trouble degrades to empty
/// lists.
async fn autocomplete(
    State(state): State<AppState>,
    Json(req): Json<AutocompleteRequest>,
) -> Json<AutocompleteResults> {
    Json(state.autocomplete.suggest(&req.query).await)
}

/// POST /v1/hotels/search
/// Priced, detail-enriched offers for a region and stay.
async fn search_hotels(
    State(state): State<AppState>,
    Json(req): Json<SearchHotelsRequest>,
) -> Result<Json<SearchHotelsResponse>, AppError> {
    if req.checkout <= req.checkin {
        return Err(AppError::ValidationError(
            "checkout must be after checkin".to_string(),
        ));
    }

    let query = SearchQuery {
        region_id: req.region_id,
        checkin: req.checkin,
        checkout: req.checkout,
        adults_total: req.adults,
        rooms_count: req.rooms,
        currency: req.currency,
    };

    let hotels = state.search.search(&query).await.map_err(supplier_error)?;
    Ok(Json(SearchHotelsResponse { hotels }))
}

/// GET /v1/hotels/{id}
/// Descriptive content for the hotel detail page.
async fn hotel_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HotelInfo>, AppError> {
    let info = state.gateway.hotel_info(&id).await.map_err(supplier_error)?;
    Ok(Json(info))
}

/// POST /v1/hotels/{id}/rates
/// Bookable room rates for one hotel; each carries the hash that starts a
/// checkout session.
async fn hotel_rates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HotelRatesBody>,
) -> Result<Json<HotelRatesResponse>, AppError> {
    let request = HotelRatesRequest {
        hotel_id: id,
        checkin: req.checkin,
        checkout: req.checkout,
        guests: distribute_occupancy(req.adults, req.rooms),
        currency: req.currency,
    };

    let rates = state
        .gateway
        .hotel_rates(&request)
        .await
        .map_err(supplier_error)?;
    Ok(Json(HotelRatesResponse { rates }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use crate::test_support::{test_state, FakeGateway};

    #[tokio::test]
    async fn test_short_autocomplete_query_never_reaches_supplier() {
        let gateway = Arc::new(FakeGateway::new());
        let state = test_state(gateway.clone());

        let Json(results) = autocomplete(
            State(state),
            Json(AutocompleteRequest {
                query: "p".to_string(),
            }),
        )
        .await;

        assert_eq!(gateway.autocomplete_calls.load(Ordering::SeqCst), 0);
        assert!(!results.regions.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_inverted_dates() {
        let state = test_state(Arc::new(FakeGateway::new()));

        let result = search_hotels(
            State(state),
            Json(SearchHotelsRequest {
                region_id: "2734".to_string(),
                checkin: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
                checkout: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
                adults: 2,
                rooms: 1,
                currency: "USD".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
