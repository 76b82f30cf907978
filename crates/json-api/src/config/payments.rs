//! Payments Config

use clap::Args;

use storefront_app::{
    domain::checkout::models::{CheckoutSettings, DEFAULT_CURRENCY},
    gateways::payments::{RAZORPAY_BASE_URL, RazorpayConfig},
};

/// Payment gateway and checkout pricing settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Razorpay key id
    #[arg(long, env = "RAZORPAY_KEY_ID")]
    pub razorpay_key_id: String,

    /// Razorpay key secret
    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    pub razorpay_key_secret: String,

    /// Razorpay API base URL
    #[arg(long, env = "RAZORPAY_BASE_URL", default_value = RAZORPAY_BASE_URL)]
    pub razorpay_base_url: String,

    /// Currency intents are created in
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub checkout_currency: String,

    /// Flat delivery charge in minor units
    #[arg(long, env = "DELIVERY_CHARGE", default_value_t = 0_u64)]
    pub delivery_charge: u64,
}

impl PaymentsConfig {
    pub(crate) fn razorpay_config(&self) -> RazorpayConfig {
        RazorpayConfig {
            base_url: self.razorpay_base_url.clone(),
            key_id: self.razorpay_key_id.clone(),
            key_secret: self.razorpay_key_secret.clone(),
        }
    }

    pub(crate) fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.checkout_currency.clone(),
            delivery_charge: self.delivery_charge,
        }
    }
}
