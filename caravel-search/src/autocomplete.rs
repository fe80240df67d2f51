//! Free-text destination lookup with a short-query guard.

use std::sync::Arc;

use serde::Serialize;

use caravel_core::models::{Suggestion, SuggestionKind};
use caravel_core::supplier::SupplierGateway;

/// Queries shorter than this never reach the supplier.
const MIN_QUERY_CHARS: usize = 2;

/// Suggestions partitioned the way the destination picker renders them.
#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteResults {
    pub regions: Vec<Suggestion>,
    pub hotels: Vec<Suggestion>,
}

impl AutocompleteResults {
    pub fn empty() -> Self {
        Self {
            regions: Vec::new(),
            hotels: Vec::new(),
        }
    }
}

/// Shown instead of supplier results while the query is too short to search.
/// Ids are supplier region ids for perennially popular cities.
pub fn popular_destinations() -> Vec<Suggestion> {
    let city = |id: &str, name: &str, country_code: &str| Suggestion {
        id: id.to_string(),
        name: name.to_string(),
        kind: SuggestionKind::City,
        country_code: Some(country_code.to_string()),
        hotel_id: None,
    };

    vec![
        city("6053839", "Dubai", "AE"),
        city("2114", "London", "GB"),
        city("2734", "Paris", "FR"),
        city("2621", "New York", "US"),
        city("965", "Bangkok", "TH"),
        city("1566", "Istanbul", "TR"),
    ]
}

/// Destination suggestion service. Callers are expected to debounce keystrokes
/// (roughly 300ms of quiet) so at most one lookup is in flight per burst.
pub struct AutocompleteService {
    gateway: Arc<dyn SupplierGateway>,
}

impl AutocompleteService {
    pub fn new(gateway: Arc<dyn SupplierGateway>) -> Self {
        Self { gateway }
    }

    /// Looks up destinations for free text. Never fails: a too-short query
    /// returns the popular-destinations set without touching the supplier, and
    /// a supplier failure degrades to empty lists so the input field keeps
    /// working.
    pub async fn suggest(&self, query: &str) -> AutocompleteResults {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return AutocompleteResults {
                regions: popular_destinations(),
                hotels: Vec::new(),
            };
        }

        match self.gateway.autocomplete(trimmed).await {
            Ok(suggestions) => {
                let (hotels, regions) = suggestions.into_iter().partition(|s: &Suggestion| s.is_hotel());
                AutocompleteResults { regions, hotels }
            }
            Err(e) => {
                tracing::warn!(error = %e, query = trimmed, "autocomplete lookup failed, returning empty suggestions");
                AutocompleteResults::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use caravel_core::models::{HotelInfo, HotelSearchHit, RoomRate};
    use caravel_core::supplier::{
        BookingForm, BookingFormRequest, BookingFinishRequest, BookingStatusData,
        CancellationOutcome, HotelRatesRequest, HotelSearchRequest, SupplierError,
    };

    struct StubGateway {
        calls: AtomicUsize,
        reply: Result<Vec<Suggestion>, SupplierError>,
    }

    impl StubGateway {
        fn returning(reply: Result<Vec<Suggestion>, SupplierError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SupplierGateway for StubGateway {
        async fn autocomplete(&self, _query: &str) -> Result<Vec<Suggestion>, SupplierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }

        async fn search_hotels(
            &self,
            _request: &HotelSearchRequest,
        ) -> Result<Vec<HotelSearchHit>, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn hotel_info(&self, _hotel_id: &str) -> Result<HotelInfo, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn hotel_rates(
            &self,
            _request: &HotelRatesRequest,
        ) -> Result<Vec<RoomRate>, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn create_booking_form(
            &self,
            _request: &BookingFormRequest,
        ) -> Result<BookingForm, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn finish_booking(
            &self,
            _request: &BookingFinishRequest,
        ) -> Result<(), SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn booking_status(
            &self,
            _partner_order_id: &str,
        ) -> Result<BookingStatusData, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }

        async fn cancel_booking(
            &self,
            _partner_order_id: &str,
        ) -> Result<CancellationOutcome, SupplierError> {
            unimplemented!("not exercised by autocomplete tests")
        }
    }

    fn suggestion(id: &str, name: &str, kind: SuggestionKind) -> Suggestion {
        Suggestion {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            country_code: None,
            hotel_id: None,
        }
    }

    #[tokio::test]
    async fn test_short_query_skips_gateway_and_returns_popular_set() {
        let gateway = Arc::new(StubGateway::returning(Ok(vec![])));
        let service = AutocompleteService::new(gateway.clone());

        let results = service.suggest("p").await;

        assert_eq!(gateway.call_count(), 0);
        assert!(!results.regions.is_empty());
        assert!(results.hotels.is_empty());
        assert_eq!(results.regions, popular_destinations());
    }

    #[tokio::test]
    async fn test_whitespace_padding_does_not_defeat_short_query_guard() {
        let gateway = Arc::new(StubGateway::returning(Ok(vec![])));
        let service = AutocompleteService::new(gateway.clone());

        service.suggest("  a  ").await;

        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_results_partition_by_kind() {
        let gateway = Arc::new(StubGateway::returning(Ok(vec![
            suggestion("2734", "Lisbon", SuggestionKind::City),
            suggestion("h-881", "Lisbon Marriott", SuggestionKind::Hotel),
            suggestion("9100", "Lisbon District", SuggestionKind::Region),
        ])));
        let service = AutocompleteService::new(gateway.clone());

        let results = service.suggest("lisbon").await;

        assert_eq!(gateway.call_count(), 1);
        assert_eq!(results.regions.len(), 2);
        assert_eq!(results.hotels.len(), 1);
        assert_eq!(results.hotels[0].id, "h-881");
    }

    #[tokio::test]
    async fn test_gateway_failure_degrades_to_empty_results() {
        let gateway = Arc::new(StubGateway::returning(Err(SupplierError::Transport(
            "connect timeout".to_string(),
        ))));
        let service = AutocompleteService::new(gateway);

        let results = service.suggest("lisbon").await;

        assert!(results.regions.is_empty());
        assert!(results.hotels.is_empty());
    }
}
