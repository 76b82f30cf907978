//! Shipping Config

use clap::Args;

use storefront_app::gateways::shipping::{ITHINK_API_URL, IThinkConfig};

/// Shipment dispatcher settings.
///
/// Shipments are refused while either credential is unset.
#[derive(Debug, Args)]
pub struct ShippingConfig {
    /// iThink Logistics API base URL
    #[arg(long, env = "ITHINK_API_URL", default_value = ITHINK_API_URL)]
    pub ithink_api_url: String,

    /// iThink Logistics access token
    #[arg(long, env = "ITHINK_API_KEY", hide_env_values = true)]
    pub ithink_api_key: Option<String>,

    /// iThink Logistics secret key
    #[arg(long, env = "ITHINK_SECRET_KEY", hide_env_values = true)]
    pub ithink_secret_key: Option<String>,

    /// Warehouse pickup location name
    #[arg(long, env = "ITHINK_PICKUP_LOCATION", default_value = "Primary")]
    pub ithink_pickup_location: String,
}

impl ShippingConfig {
    pub(crate) fn ithink_config(&self) -> IThinkConfig {
        IThinkConfig {
            api_url: self.ithink_api_url.clone(),
            api_key: self.ithink_api_key.clone(),
            secret_key: self.ithink_secret_key.clone(),
            pickup_location: self.ithink_pickup_location.clone(),
        }
    }
}
