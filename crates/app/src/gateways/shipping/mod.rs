//! Shipment Dispatcher

mod ithink;

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

pub use ithink::{ITHINK_API_URL, IThinkClient, IThinkConfig};

/// Parcel weight per unit, in kilograms.
pub const UNIT_WEIGHT_KG: f64 = 0.05;

/// Parcel dimensions in centimetres: length, breadth, height.
pub const PARCEL_DIMENSIONS_CM: (u32, u32, u32) = (25, 15, 2);

/// Everything the dispatcher needs to book a parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRequest {
    pub order_number: String,
    pub order_date: Date,
    pub recipient: Recipient,
    pub items: Vec<ShipmentItem>,
    pub cash_on_delivery: bool,
    pub sub_total: u64,
    pub shipping_charges: u64,
    pub total_discount: u64,
}

impl ShipmentRequest {
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.units)).sum()
    }

    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "parcel unit counts are far below f64 precision limits"
    )]
    pub fn weight_kg(&self) -> f64 {
        self.total_units() as f64 * UNIT_WEIGHT_KG
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentItem {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub selling_price: u64,
}

/// A booked shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipment {
    pub awb_code: String,
    pub shipment_id: Option<String>,
    pub courier_name: Option<String>,
}

/// Latest tracking state reported by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingStatus {
    pub awb_code: String,
    pub status: Option<String>,
    pub details: serde_json::Value,
}

/// Errors that can occur when communicating with the dispatcher.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Credentials are missing, so no shipment calls are made.
    #[error("shipment dispatcher is not configured")]
    NotConfigured,

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The dispatcher returned a non-2xx response or unexpected body.
    #[error("unexpected response from shipment dispatcher: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait ShipmentDispatcher: Send + Sync {
    /// Book a parcel for an order.
    async fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, ShipmentError>;

    /// Cancel a booked parcel.
    async fn cancel_shipment(&self, awb_code: &str) -> Result<(), ShipmentError>;

    /// Fetch the latest tracking state.
    async fn track_shipment(&self, awb_code: &str) -> Result<TrackingStatus, ShipmentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_scales_with_units() {
        let item = |units| ShipmentItem {
            name: "Wrap".to_string(),
            sku: "SKU".to_string(),
            units,
            selling_price: 49_900,
        };

        let request = ShipmentRequest {
            order_number: "ORD-2026-0001".to_string(),
            order_date: Date::constant(2026, 3, 1),
            recipient: Recipient {
                name: "Asha Rao".to_string(),
                phone: "9876543210".to_string(),
                email: "asha@example.com".to_string(),
                address_line1: "12 MG Road".to_string(),
                address_line2: None,
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560001".to_string(),
                country: "India".to_string(),
            },
            items: vec![item(2), item(4)],
            cash_on_delivery: false,
            sub_total: 0,
            shipping_charges: 0,
            total_discount: 0,
        };

        assert_eq!(request.total_units(), 6);
        assert!((request.weight_kg() - 0.3).abs() < 1e-9, "weight {}", request.weight_kg());
    }
}
