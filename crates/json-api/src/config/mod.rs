//! Server configuration module

use clap::Parser;

use storefront_app::context::AppConfig;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payments::PaymentsConfig,
    server::ServerRuntimeConfig,
    shipping::ShippingConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;
pub(crate) mod shipping;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Payment gateway and pricing settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Shipment dispatcher settings.
    #[command(flatten)]
    pub shipping: ShippingConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Gateway and pricing configuration for the application context.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            razorpay: self.payments.razorpay_config(),
            ithink: self.shipping.ithink_config(),
            checkout: self.payments.checkout_settings(),
        }
    }
}
