//! Scripted supplier fake and state builder shared by the handler tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;

use caravel_booking::{CheckoutOrchestrator, InstantScheduler};
use caravel_core::models::{HotelInfo, HotelSearchHit, RoomRate, Suggestion};
use caravel_core::payment::{MockPaymentCapture, PaymentCapture};
use caravel_core::supplier::{
    BookingFinishRequest, BookingForm, BookingFormRequest, BookingStatusData, CancellationOutcome,
    HotelRatesRequest, HotelSearchRequest, SupplierError, SupplierGateway,
};
use caravel_search::{AutocompleteService, SearchService};

use crate::state::AppState;

pub(crate) struct FakeGateway {
    pub autocomplete: Result<Vec<Suggestion>, SupplierError>,
    pub search: Result<Vec<HotelSearchHit>, SupplierError>,
    pub info: Result<HotelInfo, SupplierError>,
    pub rates: Result<Vec<RoomRate>, SupplierError>,
    pub form: Result<BookingForm, SupplierError>,
    pub finish: Result<(), SupplierError>,
    pub statuses: Mutex<VecDeque<Result<BookingStatusData, SupplierError>>>,
    pub cancel: Result<CancellationOutcome, SupplierError>,
    pub autocomplete_calls: AtomicUsize,
    pub finish_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self {
            autocomplete: Ok(Vec::new()),
            search: Ok(Vec::new()),
            info: Err(SupplierError::Api("info not scripted".to_string())),
            rates: Ok(Vec::new()),
            form: Err(SupplierError::Api("form not scripted".to_string())),
            finish: Ok(()),
            statuses: Mutex::new(VecDeque::new()),
            cancel: Err(SupplierError::Api("cancel not scripted".to_string())),
            autocomplete_calls: AtomicUsize::new(0),
            finish_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_form(mut self, partner_order_id: &str, order_id: i64) -> Self {
        self.form = Ok(BookingForm {
            order_id,
            partner_order_id: partner_order_id.to_string(),
            payment_types: Vec::new(),
        });
        self
    }

    pub(crate) fn with_form_error(mut self, error: SupplierError) -> Self {
        self.form = Err(error);
        self
    }

    pub(crate) fn with_finish(mut self, finish: Result<(), SupplierError>) -> Self {
        self.finish = finish;
        self
    }

    pub(crate) fn with_statuses(
        self,
        statuses: Vec<Result<BookingStatusData, SupplierError>>,
    ) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_cancel(
        mut self,
        cancel: Result<CancellationOutcome, SupplierError>,
    ) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl SupplierGateway for FakeGateway {
    async fn autocomplete(&self, _query: &str) -> Result<Vec<Suggestion>, SupplierError> {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
        self.autocomplete.clone()
    }

    async fn search_hotels(
        &self,
        _request: &HotelSearchRequest,
    ) -> Result<Vec<HotelSearchHit>, SupplierError> {
        self.search.clone()
    }

    async fn hotel_info(&self, _hotel_id: &str) -> Result<HotelInfo, SupplierError> {
        self.info.clone()
    }

    async fn hotel_rates(&self, _request: &HotelRatesRequest) -> Result<Vec<RoomRate>, SupplierError> {
        self.rates.clone()
    }

    async fn create_booking_form(
        &self,
        _request: &BookingFormRequest,
    ) -> Result<BookingForm, SupplierError> {
        self.form.clone()
    }

    async fn finish_booking(&self, _request: &BookingFinishRequest) -> Result<(), SupplierError> {
        self.finish_calls.fetch_add(1, Ordering::SeqCst);
        self.finish.clone()
    }

    async fn booking_status(
        &self,
        _partner_order_id: &str,
    ) -> Result<BookingStatusData, SupplierError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("status polled more times than scripted")
    }

    async fn cancel_booking(
        &self,
        _partner_order_id: &str,
    ) -> Result<CancellationOutcome, SupplierError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        // One scheduler turn mid-call, so concurrent handler tests can
        // interleave while a cancel is in flight.
        tokio::task::yield_now().await;
        self.cancel.clone()
    }
}

/// Assembles an `AppState` around the fake, with instant poll scheduling so
/// driver tests finish without waiting out real intervals.
pub(crate) fn test_state(gateway: Arc<FakeGateway>) -> AppState {
    test_state_with_payments(gateway, Arc::new(MockPaymentCapture))
}

/// Same, with a caller-scripted payment processor.
pub(crate) fn test_state_with_payments(
    gateway: Arc<FakeGateway>,
    payments: Arc<dyn PaymentCapture>,
) -> AppState {
    let gateway: Arc<dyn SupplierGateway> = gateway;
    let (events_tx, _) = broadcast::channel(16);

    AppState {
        gateway: gateway.clone(),
        autocomplete: Arc::new(AutocompleteService::new(gateway.clone())),
        search: Arc::new(SearchService::new(gateway.clone())),
        checkout: Arc::new(CheckoutOrchestrator::new(
            gateway,
            payments,
            Arc::new(InstantScheduler::new()),
        )),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        records: Arc::new(RwLock::new(HashMap::new())),
        events_tx,
    }
}
