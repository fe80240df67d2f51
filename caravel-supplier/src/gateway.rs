//! HTTP implementation of [`SupplierGateway`] against the supplier proxy.
//!
//! Every call is a JSON POST. Transport failures and 5xx replies are retried
//! with a linearly growing backoff; business rejections (`success: false`) and
//! 4xx replies are returned to the caller on the first attempt.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use caravel_core::models::{HotelInfo, HotelSearchHit, RoomRate, Suggestion};
use caravel_core::supplier::{
    BookingForm, BookingFormRequest, BookingFinishRequest, BookingStatusData, CancellationOutcome,
    HotelRatesRequest, HotelSearchRequest, SupplierError, SupplierGateway,
};

use crate::wire;

/// Error string the proxy uses when a selected rate has gone stale.
const RATE_NOT_FOUND: &str = "rate_not_found";

/// Retry budget for transport-level failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before retry N is `base_delay * N`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, completed_attempts: u32) -> Duration {
        self.base_delay * completed_attempts
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Proxy base, e.g. `http://localhost:9000/api`. Endpoint paths are
    /// appended verbatim.
    pub base_url: String,
    /// Content language forwarded on every call.
    pub language: String,
    /// Guest residency country code, used for rate eligibility.
    pub residency: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000/api".to_string(),
            language: "en".to_string(),
            residency: "us".to_string(),
            request_timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct HttpSupplierGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpSupplierGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, SupplierError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SupplierError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// POST `body` to `path`, retrying transport failures per the policy.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SupplierError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let mut last_error = SupplierError::Transport(format!("{}: no attempts made", path));

        for attempt in 1..=self.config.retry.max_attempts {
            if attempt > 1 {
                let delay = self.config.retry.backoff(attempt - 1);
                tracing::warn!(
                    path,
                    attempt,
                    max_attempts = self.config.retry.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying supplier call after transport failure"
                );
                tokio::time::sleep(delay).await;
            }

            match self.client.post(&url).json(body).send().await {
                Err(e) => {
                    last_error = SupplierError::Transport(format!("{}: {}", path, e));
                }
                Ok(response) if response.status().is_server_error() => {
                    last_error =
                        SupplierError::Transport(format!("{} returned {}", path, response.status()));
                }
                Ok(response) if !response.status().is_success() => {
                    // Client errors are not transient; surface immediately.
                    return Err(SupplierError::Api(format!(
                        "{} returned {}",
                        path,
                        response.status()
                    )));
                }
                Ok(response) => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| SupplierError::Decode(format!("{}: {}", path, e)));
                }
            }
        }

        tracing::error!(path, "supplier call failed after all retry attempts");
        Err(last_error)
    }
}

/// Map a `success: false` envelope to the matching domain error.
fn check_envelope(success: bool, error: Option<String>) -> Result<(), SupplierError> {
    if success {
        return Ok(());
    }
    match error {
        Some(e) if e == RATE_NOT_FOUND => Err(SupplierError::RateNotFound),
        Some(e) => Err(SupplierError::Api(e)),
        None => Err(SupplierError::Api("unspecified supplier error".to_string())),
    }
}

#[async_trait]
impl SupplierGateway for HttpSupplierGateway {
    async fn autocomplete(&self, query: &str) -> Result<Vec<Suggestion>, SupplierError> {
        let body = wire::AutocompleteBody {
            query,
            language: &self.config.language,
        };
        let response: wire::AutocompleteResponse =
            self.post_json("/hotels/autocomplete", &body).await?;
        check_envelope(response.success, response.error)?;

        // Regions first, hotels after; callers partition on `kind`.
        let mut suggestions = response.regions;
        suggestions.extend(response.hotels);
        Ok(suggestions)
    }

    async fn search_hotels(
        &self,
        request: &HotelSearchRequest,
    ) -> Result<Vec<HotelSearchHit>, SupplierError> {
        let body = wire::SearchBody {
            region_id: &request.region_id,
            checkin: request.checkin,
            checkout: request.checkout,
            guests: &request.guests,
            currency: &request.currency,
            language: &self.config.language,
            residency: &self.config.residency,
        };
        let response: wire::SearchResponse = self.post_json("/hotels/search", &body).await?;
        check_envelope(response.success, response.error)?;
        Ok(response.hotels)
    }

    async fn hotel_info(&self, hotel_id: &str) -> Result<HotelInfo, SupplierError> {
        let body = wire::InfoBody {
            id: hotel_id,
            language: &self.config.language,
        };
        let response: wire::InfoResponse = self.post_json("/hotels/info", &body).await?;
        check_envelope(response.success, response.error)?;
        response
            .hotel
            .ok_or_else(|| SupplierError::Decode("info response missing hotel".to_string()))
    }

    async fn hotel_rates(
        &self,
        request: &HotelRatesRequest,
    ) -> Result<Vec<RoomRate>, SupplierError> {
        let body = wire::RatesBody {
            id: &request.hotel_id,
            checkin: request.checkin,
            checkout: request.checkout,
            guests: &request.guests,
            currency: &request.currency,
            language: &self.config.language,
            residency: &self.config.residency,
        };
        let response: wire::RatesResponse = self.post_json("/hotels/rates", &body).await?;
        check_envelope(response.success, response.error)?;
        Ok(response.rates)
    }

    async fn create_booking_form(
        &self,
        request: &BookingFormRequest,
    ) -> Result<BookingForm, SupplierError> {
        let body = wire::FormBody {
            book_hash: &request.book_hash,
            match_hash: request.match_hash.as_deref(),
            language: &self.config.language,
        };
        let response: wire::FormResponse = self.post_json("/hotels/booking/form", &body).await?;
        check_envelope(response.success, response.error)?;
        response
            .data
            .ok_or_else(|| SupplierError::Decode("form response missing data".to_string()))
    }

    async fn finish_booking(&self, request: &BookingFinishRequest) -> Result<(), SupplierError> {
        let body = wire::FinishBody {
            partner_order_id: &request.partner_order_id,
            guests: &request.guests,
            user: &request.contact,
            payment: &request.payment,
            rooms_count: request.rooms_count,
            stripe_payment_id: &request.payment_reference,
            language: &self.config.language,
        };
        let response: wire::FinishResponse = self.post_json("/hotels/booking/finish", &body).await?;
        let detail = response.error.or(response.message);
        check_envelope(response.success, detail)?;
        Ok(())
    }

    async fn booking_status(
        &self,
        partner_order_id: &str,
    ) -> Result<BookingStatusData, SupplierError> {
        let body = wire::OrderRefBody { partner_order_id };
        let response: wire::StatusResponse = self.post_json("/hotels/booking/status", &body).await?;
        check_envelope(response.success, response.error)?;
        response
            .data
            .ok_or_else(|| SupplierError::Decode("status response missing data".to_string()))
    }

    async fn cancel_booking(
        &self,
        partner_order_id: &str,
    ) -> Result<CancellationOutcome, SupplierError> {
        let body = wire::OrderRefBody { partner_order_id };
        let response: wire::CancelResponse = self.post_json("/hotels/booking/cancel", &body).await?;
        check_envelope(response.success, response.error)?;

        let mut outcome = response.data.unwrap_or(CancellationOutcome {
            refunded: None,
            cancellation_fee: None,
            message: None,
        });
        if outcome.message.is_none() {
            outcome.message = response.message;
        }
        Ok(outcome)
    }
}
