//! Hotel search with concurrent, failure-tolerant detail enrichment.
//!
//! A search produces priced hits; descriptive content (name, images,
//! amenities) lives behind a separate supplier endpoint. The pipeline fans out
//! one detail call per hit, staggered to avoid a thundering herd, and settles
//! them all: a failed detail call downgrades that one hotel to synthesized
//! content instead of failing the batch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;

use caravel_core::models::{HotelInfo, HotelSearchHit};
use caravel_core::supplier::{HotelSearchRequest, SupplierError, SupplierGateway};

use crate::occupancy::distribute_occupancy;

/// At most this many hits are enriched and returned per search. Keeps the
/// detail-call volume against the supplier bounded.
const ENRICHMENT_CAP: usize = 15;

/// Detail calls start this far apart, multiplied by list position.
const STAGGER_STEP: Duration = Duration::from_millis(50);

const FALLBACK_IMAGE: &str = "/images/hotel-placeholder.jpg";

/// A region search as the caller expresses it, before occupancy expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub region_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults_total: u32,
    pub rooms_count: u32,
    pub currency: String,
}

/// Where an offer's descriptive content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentSource {
    /// Content came from the supplier's info endpoint.
    Enriched,
    /// The detail call failed; name and imagery are synthesized from the id.
    Fallback,
}

/// A priced hotel offer ready for display: search-result pricing merged with
/// detail content. Offers are never dropped for missing detail or pricing.
#[derive(Debug, Clone, Serialize)]
pub struct HotelOffer {
    pub id: String,
    pub hid: Option<i64>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub star_rating: Option<u8>,
    pub review_score: Option<f32>,
    pub reviews_count: Option<u32>,
    /// Always non-negative; 0.0 when the supplier omitted pricing.
    pub price: f64,
    pub currency: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub description: Option<String>,
    pub best_offer: Option<String>,
    pub total_rates: Option<u32>,
    pub enrichment: EnrichmentSource,
}

/// "grand_palace_hotel" -> "Grand Palace Hotel". Used when the supplier never
/// told us a hotel's real name.
fn title_case_id(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_offer(hit: &HotelSearchHit, info: Option<HotelInfo>, requested_currency: &str) -> HotelOffer {
    let price = hit.price.unwrap_or(0.0).max(0.0);
    let currency = hit
        .currency
        .clone()
        .unwrap_or_else(|| requested_currency.to_string());

    match info {
        Some(info) => HotelOffer {
            id: hit.id.clone(),
            hid: hit.hid,
            name: info.name,
            address: info.address,
            city: info.city,
            country: info.country,
            star_rating: info.star_rating,
            review_score: info.review_score,
            reviews_count: info.reviews_count,
            price,
            currency,
            image: info.images.first().cloned(),
            images: info.images,
            amenities: info.amenities,
            description: info.description,
            best_offer: hit.best_offer.clone(),
            total_rates: hit.total_rates,
            enrichment: EnrichmentSource::Enriched,
        },
        None => HotelOffer {
            id: hit.id.clone(),
            hid: hit.hid,
            name: title_case_id(&hit.id),
            address: None,
            city: None,
            country: None,
            star_rating: None,
            review_score: None,
            reviews_count: None,
            price,
            currency,
            image: Some(FALLBACK_IMAGE.to_string()),
            images: vec![FALLBACK_IMAGE.to_string()],
            amenities: vec!["Free WiFi".to_string()],
            description: None,
            best_offer: hit.best_offer.clone(),
            total_rates: hit.total_rates,
            enrichment: EnrichmentSource::Fallback,
        },
    }
}

/// Region search plus per-hotel detail enrichment.
///
/// Detail content is long-lived, so successful lookups are memoized for the
/// service's lifetime; search results are never cached.
pub struct SearchService {
    gateway: Arc<dyn SupplierGateway>,
    info_cache: RwLock<HashMap<String, HotelInfo>>,
}

impl SearchService {
    pub fn new(gateway: Arc<dyn SupplierGateway>) -> Self {
        Self {
            gateway,
            info_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Runs a region search and enriches the top hits concurrently.
    ///
    /// Fails only when the search call itself fails; detail failures degrade
    /// per hotel. Output order matches the supplier's search-result order
    /// regardless of detail-call completion order.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<HotelOffer>, SupplierError> {
        let request = HotelSearchRequest {
            region_id: query.region_id.clone(),
            checkin: query.checkin,
            checkout: query.checkout,
            guests: distribute_occupancy(query.adults_total, query.rooms_count),
            currency: query.currency.clone(),
        };

        let hits = self.gateway.search_hotels(&request).await?;
        let total_found = hits.len();
        let shortlist: Vec<HotelSearchHit> = hits.into_iter().take(ENRICHMENT_CAP).collect();

        tracing::info!(
            region_id = %query.region_id,
            total_found,
            enriching = shortlist.len(),
            "hotel search returned"
        );

        let details = join_all(
            shortlist
                .iter()
                .enumerate()
                .map(|(index, hit)| self.fetch_detail(index, &hit.id)),
        )
        .await;

        Ok(shortlist
            .iter()
            .zip(details)
            .map(|(hit, info)| build_offer(hit, info, &query.currency))
            .collect())
    }

    /// One hotel's detail lookup, staggered by list position. `None` means the
    /// caller should synthesize fallback content for this hotel.
    async fn fetch_detail(&self, index: usize, hotel_id: &str) -> Option<HotelInfo> {
        {
            let cache = self.info_cache.read().await;
            if let Some(cached) = cache.get(hotel_id) {
                return Some(cached.clone());
            }
        }

        tokio::time::sleep(STAGGER_STEP * index as u32).await;

        match self.gateway.hotel_info(hotel_id).await {
            Ok(info) => {
                self.info_cache
                    .write()
                    .await
                    .insert(hotel_id.to_string(), info.clone());
                Some(info)
            }
            Err(e) => {
                tracing::warn!(hotel_id, error = %e, "hotel detail fetch failed, using fallback content");
                None
            }
        }
    }
}
