pub mod gateway;
mod wire;

pub use gateway::{GatewayConfig, HttpSupplierGateway, RetryPolicy};
