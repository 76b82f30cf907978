//! iThink Logistics client.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::gateways::shipping::{
    PARCEL_DIMENSIONS_CM, Shipment, ShipmentDispatcher, ShipmentError, ShipmentRequest,
    TrackingStatus,
};

/// Default API base.
pub const ITHINK_API_URL: &str = "https://pre-alpha.ithinklogistics.com/api_v3";

/// Configuration for connecting to iThink Logistics.
#[derive(Clone)]
pub struct IThinkConfig {
    pub api_url: String,

    /// Shipment calls are skipped while either credential is missing.
    pub api_key: Option<String>,

    pub secret_key: Option<String>,

    /// Registered warehouse name parcels are picked up from.
    pub pickup_location: String,
}

impl fmt::Debug for IThinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IThinkConfig")
            .field("api_url", &self.api_url)
            .field("configured", &self.credentials().is_some())
            .field("pickup_location", &self.pickup_location)
            .finish_non_exhaustive()
    }
}

impl IThinkConfig {
    fn credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref().filter(|key| !key.is_empty())?;
        let secret_key = self.secret_key.as_deref().filter(|key| !key.is_empty())?;

        Some((api_key, secret_key))
    }
}

/// HTTP client for iThink shipments.
#[derive(Debug, Clone)]
pub struct IThinkClient {
    config: IThinkConfig,
    http: Client,
}

impl IThinkClient {
    #[must_use]
    pub fn new(config: IThinkConfig) -> Self {
        if config.credentials().is_none() {
            info!("iThink credentials missing, shipment creation is disabled");
        }

        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ShipmentError> {
        let (api_key, secret_key) = self
            .config
            .credentials()
            .ok_or(ShipmentError::NotConfigured)?;

        Ok(request.bearer_auth(api_key).header("Secret-Key", secret_key))
    }

    async fn read(response: reqwest::Response, action: &str) -> Result<Value, ShipmentError> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ShipmentError::UnexpectedResponse(format!(
                "{action} failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ShipmentDispatcher for IThinkClient {
    async fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, ShipmentError> {
        let payload = CreateOrderPayload {
            data: CreateOrderData::new(request, &self.config.pickup_location),
        };

        let response = self
            .authorize(self.http.post(self.url("create_order.json")))?
            .json(&payload)
            .send()
            .await?;

        let body = Self::read(response, "shipment creation").await?;
        let created: CreatedShipment = serde_json::from_value(body)
            .map_err(|e| ShipmentError::UnexpectedResponse(e.to_string()))?;

        let awb_code = created
            .awb_code
            .filter(|awb| !awb.is_empty())
            .ok_or_else(|| {
                ShipmentError::UnexpectedResponse("shipment created without an AWB".to_string())
            })?;

        debug!(order = %request.order_number, %awb_code, "booked shipment");

        Ok(Shipment {
            awb_code,
            shipment_id: created.shipment_id.map(|id| json_to_string(&id)),
            courier_name: created.courier_name,
        })
    }

    async fn cancel_shipment(&self, awb_code: &str) -> Result<(), ShipmentError> {
        let response = self
            .authorize(self.http.post(self.url("cancel_order.json")))?
            .json(&serde_json::json!({ "awb_code": awb_code }))
            .send()
            .await?;

        Self::read(response, "shipment cancellation").await?;

        Ok(())
    }

    async fn track_shipment(&self, awb_code: &str) -> Result<TrackingStatus, ShipmentError> {
        let response = self
            .authorize(self.http.get(self.url("track_awb.json")))?
            .query(&[("awb_code", awb_code)])
            .send()
            .await?;

        let details = Self::read(response, "shipment tracking").await?;

        Ok(TrackingStatus {
            awb_code: awb_code.to_string(),
            status: tracking_status(&details, awb_code),
            details,
        })
    }
}

/// Pull the current status out of a `track_awb` response.
fn tracking_status(details: &Value, awb_code: &str) -> Option<String> {
    let entry = details
        .get("data")
        .and_then(|data| data.get(awb_code))
        .unwrap_or(details);

    entry
        .get("current_status")
        .or_else(|| entry.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Minor units rendered as a major-unit decimal, e.g. `49900` as `"499.00"`.
fn minor_to_major(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

#[derive(Debug, Serialize)]
struct CreateOrderPayload<'a> {
    data: CreateOrderData<'a>,
}

#[derive(Debug, Serialize)]
struct CreateOrderData<'a> {
    order_id: &'a str,
    order_date: String,
    pickup_location: &'a str,
    comment: &'static str,
    billing_customer_name: &'a str,
    billing_address: &'a str,
    billing_address_2: &'a str,
    billing_city: &'a str,
    billing_pincode: &'a str,
    billing_state: &'a str,
    billing_country: &'a str,
    billing_email: &'a str,
    billing_phone: &'a str,
    shipping_is_billing: bool,
    order_items: Vec<OrderItemPayload<'a>>,
    payment_method: &'static str,
    shipping_charges: String,
    total_discount: String,
    sub_total: String,
    length: u32,
    breadth: u32,
    height: u32,
    weight: f64,
}

impl<'a> CreateOrderData<'a> {
    fn new(request: &'a ShipmentRequest, pickup_location: &'a str) -> Self {
        let recipient = &request.recipient;
        let (length, breadth, height) = PARCEL_DIMENSIONS_CM;

        Self {
            order_id: &request.order_number,
            order_date: request.order_date.to_string(),
            pickup_location,
            comment: "Phone Wrap Order",
            billing_customer_name: &recipient.name,
            billing_address: &recipient.address_line1,
            billing_address_2: recipient.address_line2.as_deref().unwrap_or_default(),
            billing_city: &recipient.city,
            billing_pincode: &recipient.pincode,
            billing_state: &recipient.state,
            billing_country: &recipient.country,
            billing_email: &recipient.email,
            billing_phone: &recipient.phone,
            shipping_is_billing: true,
            order_items: request
                .items
                .iter()
                .map(|item| OrderItemPayload {
                    name: &item.name,
                    sku: &item.sku,
                    units: item.units,
                    selling_price: minor_to_major(item.selling_price),
                })
                .collect(),
            payment_method: if request.cash_on_delivery { "COD" } else { "Prepaid" },
            shipping_charges: minor_to_major(request.shipping_charges),
            total_discount: minor_to_major(request.total_discount),
            sub_total: minor_to_major(request.sub_total),
            length,
            breadth,
            height,
            weight: request.weight_kg(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OrderItemPayload<'a> {
    name: &'a str,
    sku: &'a str,
    units: u32,
    selling_price: String,
}

#[derive(Debug, Deserialize)]
struct CreatedShipment {
    awb_code: Option<String>,
    shipment_id: Option<Value>,
    courier_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use jiff::civil::Date;
    use testresult::TestResult;

    use crate::gateways::shipping::{Recipient, ShipmentItem};

    use super::*;

    fn config(api_key: Option<&str>) -> IThinkConfig {
        IThinkConfig {
            api_url: ITHINK_API_URL.to_string(),
            api_key: api_key.map(str::to_string),
            secret_key: Some("secret".to_string()),
            pickup_location: "Primary".to_string(),
        }
    }

    fn request(cash_on_delivery: bool) -> ShipmentRequest {
        ShipmentRequest {
            order_number: "ORD-2026-0042".to_string(),
            order_date: Date::constant(2026, 3, 14),
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
            items: vec![ShipmentItem {
                name: "Wrap".to_string(),
                sku: "sku-1".to_string(),
                units: 2,
                selling_price: 49_900,
            }],
            cash_on_delivery,
            sub_total: 99_800,
            shipping_charges: 0,
            total_discount: 9_980,
        }
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit() {
        let client = IThinkClient::new(config(None));

        let result = client.track_shipment("AWB1").await;

        assert!(
            matches!(result, Err(ShipmentError::NotConfigured)),
            "expected NotConfigured, got {result:?}"
        );

        let result = client.create_shipment(&request(false)).await;

        assert!(
            matches!(result, Err(ShipmentError::NotConfigured)),
            "expected NotConfigured, got {result:?}"
        );
    }

    #[test]
    fn payload_uses_parcel_defaults() -> TestResult {
        let request = request(true);
        let payload = serde_json::to_value(CreateOrderPayload {
            data: CreateOrderData::new(&request, "Primary"),
        })?;

        let field = |path: &str| payload.pointer(path).cloned();

        assert_eq!(field("/data/payment_method"), Some(Value::from("COD")));
        assert_eq!(field("/data/order_date"), Some(Value::from("2026-03-14")));
        assert_eq!(field("/data/length"), Some(Value::from(25)));
        assert_eq!(field("/data/breadth"), Some(Value::from(15)));
        assert_eq!(field("/data/height"), Some(Value::from(2)));
        assert_eq!(field("/data/sub_total"), Some(Value::from("998.00")));
        assert_eq!(
            field("/data/order_items/0/selling_price"),
            Some(Value::from("499.00"))
        );

        Ok(())
    }

    #[test]
    fn tracking_status_reads_keyed_or_flat_responses() {
        let keyed = serde_json::json!({
            "status_code": 200,
            "data": { "AWB1": { "current_status": "In Transit" } }
        });
        let flat = serde_json::json!({ "status": "Delivered" });

        assert_eq!(tracking_status(&keyed, "AWB1").as_deref(), Some("In Transit"));
        assert_eq!(tracking_status(&flat, "AWB1").as_deref(), Some("Delivered"));
        assert_eq!(tracking_status(&Value::Null, "AWB1"), None);
    }

    #[test]
    fn minor_units_render_as_major_decimal() {
        assert_eq!(minor_to_major(49_900), "499.00");
        assert_eq!(minor_to_major(5), "0.05");
    }
}
