//! Payment Gateway

mod razorpay;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

pub use razorpay::{RAZORPAY_BASE_URL, RazorpayClient, RazorpayConfig};

/// A payment intent created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Settlement state of an intent as the gateway reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    Settled,
    Pending,
    Failed,
}

/// Errors that can occur when communicating with the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-2xx response or unexpected body.
    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount` minor units.
    async fn create_intent(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Ask the gateway whether an intent has settled.
    async fn fetch_intent_status(&self, intent_id: &str)
    -> Result<IntentStatus, PaymentGatewayError>;
}
