//! Razorpay Orders API client.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::gateways::payments::{IntentStatus, PaymentGateway, PaymentGatewayError, PaymentIntent};

/// Default API base.
pub const RAZORPAY_BASE_URL: &str = "https://api.razorpay.com";

/// Configuration for connecting to Razorpay.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API base, e.g. `"https://api.razorpay.com"`.
    pub base_url: String,

    pub key_id: String,

    pub key_secret: String,
}

impl fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"**redacted**")
            .finish()
    }
}

/// HTTP client for Razorpay orders.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    config: RazorpayConfig,
    http: Client,
}

impl RazorpayClient {
    #[must_use]
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn read<T>(response: reqwest::Response, action: &str) -> Result<T, PaymentGatewayError>
    where
        T: serde::de::DeserializeOwned,
    {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(PaymentGatewayError::UnexpectedResponse(format!(
                "{action} failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_intent(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let body = serde_json::json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
        });

        let response = self
            .http
            .post(self.url("/v1/orders"))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await?;

        let order: RazorpayOrder = Self::read(response, "order creation").await?;

        debug!(intent = %order.id, amount = order.amount, "created gateway order");

        Ok(PaymentIntent {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    async fn fetch_intent_status(
        &self,
        intent_id: &str,
    ) -> Result<IntentStatus, PaymentGatewayError> {
        let response = self
            .http
            .get(self.url(&format!("/v1/orders/{intent_id}")))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .send()
            .await?;

        let order: RazorpayOrder = Self::read(response, "order lookup").await?;

        Ok(intent_status(&order.status))
    }
}

/// Razorpay order states: `created`, `attempted`, `paid`.
fn intent_status(status: &str) -> IntentStatus {
    match status {
        "paid" => IntentStatus::Settled,
        "created" | "attempted" => IntentStatus::Pending,
        _ => IntentStatus::Failed,
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: u64,
    currency: String,
    status: String,
}
