use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use caravel_api::app_config::Config;
use caravel_api::{app, AppState};
use caravel_booking::{CheckoutOrchestrator, PollPolicy, TokioScheduler};
use caravel_core::payment::MockPaymentCapture;
use caravel_core::supplier::SupplierGateway;
use caravel_search::{AutocompleteService, SearchService};
use caravel_supplier::{GatewayConfig, HttpSupplierGateway, RetryPolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caravel_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Caravel API on port {}", config.server.port);

    // Supplier Gateway
    let gateway: Arc<dyn SupplierGateway> = Arc::new(
        HttpSupplierGateway::new(GatewayConfig {
            base_url: config.supplier.base_url.clone(),
            language: config.supplier.language.clone(),
            residency: config.supplier.residency.clone(),
            request_timeout: Duration::from_secs(config.supplier.request_timeout_seconds),
            retry: RetryPolicy {
                max_attempts: config.supplier.retry_max_attempts,
                base_delay: Duration::from_millis(config.supplier.retry_base_delay_ms),
            },
        })
        .expect("Failed to build supplier gateway"),
    );

    // Card entry and tokenization live in the storefront; this service only
    // consumes capture outcomes, mocked until the processor account lands.
    let payments = Arc::new(MockPaymentCapture);

    let checkout = CheckoutOrchestrator::new(gateway.clone(), payments, Arc::new(TokioScheduler))
        .with_policy(PollPolicy {
            interval: Duration::from_secs(config.booking.poll_interval_seconds),
            max_attempts: config.booking.poll_max_attempts,
        });

    // SSE Broadcast Channel
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        gateway: gateway.clone(),
        autocomplete: Arc::new(AutocompleteService::new(gateway.clone())),
        search: Arc::new(SearchService::new(gateway.clone())),
        checkout: Arc::new(checkout),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        records: Arc::new(RwLock::new(HashMap::new())),
        events_tx,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
