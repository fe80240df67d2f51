use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use caravel_booking::{BookingRecord, BookingSession, CheckoutOrchestrator};
use caravel_core::supplier::SupplierGateway;
use caravel_search::{AutocompleteService, SearchService};
use caravel_shared::BookingStatusEvent;

/// Everything lives in memory: sessions and records are keyed by
/// `partner_order_id`, and durable persistence is left to whatever consumes
/// the records.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn SupplierGateway>,
    pub autocomplete: Arc<AutocompleteService>,
    pub search: Arc<SearchService>,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub sessions: Arc<RwLock<HashMap<String, BookingSession>>>,
    pub records: Arc<RwLock<HashMap<String, BookingRecord>>>,
    pub events_tx: broadcast::Sender<BookingStatusEvent>,
}

/// Read with poison recovery; a panicked writer leaves the map usable.
pub fn read_store<T>(store: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_store<T>(store: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}
