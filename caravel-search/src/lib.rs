//! Destination autocomplete and the hotel search/enrichment pipeline.

pub mod autocomplete;
pub mod occupancy;
pub mod pipeline;

pub use autocomplete::{AutocompleteResults, AutocompleteService};
pub use occupancy::distribute_occupancy;
pub use pipeline::{EnrichmentSource, HotelOffer, SearchQuery, SearchService};
