//! Order request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::{
    domain::orders::models::{
        DEFAULT_COUNTRY, LeaderboardEntry, Order, OrderLine, ShipmentRecord, ShippingAddress,
        StatusEntry, Tracking,
    },
    gateways::shipping::TrackingStatus,
};

use crate::carts::models::{AppliedCouponResponse, CustomDesignPayload};

/// Shipping Address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressPayload {
    /// Recipient name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email address
    pub email: String,

    /// First address line
    pub address_line1: String,

    /// Second address line
    #[serde(default)]
    pub address_line2: Option<String>,

    /// City
    pub city: String,

    /// State or province
    #[serde(default)]
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Country, defaults to India
    #[serde(default)]
    pub country: Option<String>,

    /// Nearby landmark
    #[serde(default)]
    pub landmark: Option<String>,
}

impl From<ShippingAddressPayload> for ShippingAddress {
    fn from(payload: ShippingAddressPayload) -> Self {
        ShippingAddress {
            full_name: payload.full_name,
            phone: payload.phone,
            email: payload.email,
            address_line1: payload.address_line1,
            address_line2: payload.address_line2,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            country: payload
                .country
                .filter(|country| !country.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            landmark: payload.landmark,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressPayload {
    fn from(address: ShippingAddress) -> Self {
        Self {
            full_name: address.full_name,
            phone: address.phone,
            email: address.email,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: Some(address.country),
            landmark: address.landmark,
        }
    }
}

/// Tracking Details
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackingPayload {
    /// Courier tracking number
    #[serde(default)]
    pub tracking_number: Option<String>,

    /// Public tracking page
    #[serde(default)]
    pub tracking_link: Option<String>,

    /// Courier name
    #[serde(default)]
    pub courier_name: Option<String>,
}

impl From<TrackingPayload> for Tracking {
    fn from(payload: TrackingPayload) -> Self {
        Tracking {
            tracking_number: payload.tracking_number,
            tracking_link: payload.tracking_link,
            courier_name: payload.courier_name,
        }
    }
}

impl From<Tracking> for TrackingPayload {
    fn from(tracking: Tracking) -> Self {
        Self {
            tracking_number: tracking.tracking_number,
            tracking_link: tracking.tracking_link,
            courier_name: tracking.courier_name,
        }
    }
}

/// Shipment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShipmentResponse {
    /// Air waybill number
    pub awb_code: String,

    /// Dispatcher shipment id
    pub shipment_id: Option<String>,

    /// Assigned courier
    pub courier_name: Option<String>,
}

impl From<ShipmentRecord> for ShipmentResponse {
    fn from(shipment: ShipmentRecord) -> Self {
        Self {
            awb_code: shipment.awb_code,
            shipment_id: shipment.shipment_id,
            courier_name: shipment.courier_name,
        }
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    /// `item`, `product`, `collection`, `custom_design` or `suggested_item`
    pub item_type: String,

    /// Product or collection UUID
    pub reference: Uuid,

    /// Collection the line was expanded from
    pub collection_uuid: Option<Uuid>,

    /// Name of that collection
    pub collection_name: Option<String>,

    /// Product name at purchase time
    pub product_name: String,

    /// Product image at purchase time
    pub image: Option<String>,

    /// Price per unit in minor units
    pub unit_price: u64,

    /// Number of units
    pub quantity: u32,

    /// Model the line ships for
    pub phone_model: String,

    /// Design for custom lines
    pub custom_design: Option<CustomDesignPayload>,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        let (collection_uuid, collection_name) = line
            .collection
            .map(|collection| (Some(collection.uuid.into_uuid()), Some(collection.name)))
            .unwrap_or_default();

        Self {
            item_type: line.item_type.to_string(),
            reference: line.reference,
            collection_uuid,
            collection_name,
            product_name: line.product_name,
            image: line.image,
            unit_price: line.unit_price,
            quantity: line.quantity,
            phone_model: line.phone_model,
            custom_design: line.custom_design.as_ref().map(CustomDesignPayload::from),
        }
    }
}

/// Status History Entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusEntryResponse {
    /// Status entered
    pub status: String,

    /// Reason or comment
    pub note: String,

    /// `customer`, `admin` or `system`
    pub actor: String,

    /// When the change was recorded
    pub recorded_at: String,
}

impl From<StatusEntry> for StatusEntryResponse {
    fn from(entry: StatusEntry) -> Self {
        Self {
            status: entry.status.to_string(),
            note: entry.note,
            actor: entry.actor.to_string(),
            recorded_at: entry.recorded_at.to_string(),
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// Order UUID
    pub uuid: Uuid,

    /// Human-readable order number, `ORD-{year}-{sequence}`
    pub order_number: String,

    /// Buyer account UUID
    pub account: Uuid,

    /// Purchased lines
    pub lines: Vec<OrderLineResponse>,

    /// Sum of line totals
    pub subtotal: u64,

    /// Delivery charge
    pub shipping_cost: u64,

    /// Sum of coupon discounts
    pub discount_total: u64,

    /// Amount charged
    pub total_amount: u64,

    /// Coupons applied at checkout
    pub applied_coupons: Vec<AppliedCouponResponse>,

    /// Lifecycle status
    pub status: String,

    /// `gateway` or `cash_on_delivery`
    pub payment_method: String,

    /// Payment status
    pub payment_status: String,

    /// Gateway intent the order was paid through
    pub gateway_intent_id: Option<String>,

    /// Gateway payment id relayed by the buyer
    pub gateway_payment_id: Option<String>,

    /// Delivery address
    pub shipping_address: ShippingAddressPayload,

    /// Booked shipment
    pub shipment: Option<ShipmentResponse>,

    /// Manually entered tracking
    pub tracking: TrackingPayload,

    /// Why the order was cancelled
    pub cancellation_reason: Option<String>,

    /// Who cancelled the order
    pub cancelled_by: Option<String>,

    /// Status changes, oldest first
    pub history: Vec<StatusEntryResponse>,

    /// Creation time
    pub created_at: String,

    /// Last update time
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_number: order.order_number,
            account: order.account.into_uuid(),
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            discount_total: order.discount_total,
            total_amount: order.total_amount,
            applied_coupons: order
                .applied_coupons
                .into_iter()
                .map(AppliedCouponResponse::from)
                .collect(),
            status: order.status.to_string(),
            payment_method: order.payment_method.to_string(),
            payment_status: order.payment_status.to_string(),
            gateway_intent_id: order.gateway_intent_id,
            gateway_payment_id: order.gateway_payment_id,
            shipping_address: order.shipping_address.into(),
            shipment: order.shipment.map(ShipmentResponse::from),
            tracking: order.tracking.into(),
            cancellation_reason: order.cancellation_reason,
            cancelled_by: order.cancelled_by.map(|actor| actor.to_string()),
            history: order
                .history
                .into_iter()
                .map(StatusEntryResponse::from)
                .collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Tracking Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackingStatusResponse {
    /// Air waybill number
    pub awb_code: String,

    /// Current status as reported by the courier
    pub status: Option<String>,

    /// Raw dispatcher response
    #[salvo(schema(value_type = Object))]
    pub details: serde_json::Value,
}

impl From<TrackingStatus> for TrackingStatusResponse {
    fn from(tracking: TrackingStatus) -> Self {
        Self {
            awb_code: tracking.awb_code,
            status: tracking.status,
            details: tracking.details,
        }
    }
}

/// Leaderboard Entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LeaderboardEntryResponse {
    /// 1-based position
    pub rank: usize,

    /// Account UUID
    pub account: Uuid,

    /// Public username
    pub username: String,

    /// Points earned
    pub points: u64,

    /// Counted orders
    pub orders: u64,
}

impl LeaderboardEntryResponse {
    pub(crate) fn ranked(rank: usize, entry: LeaderboardEntry) -> Self {
        Self {
            rank,
            account: entry.account.into_uuid(),
            username: entry.username,
            points: entry.points,
            orders: entry.orders,
        }
    }
}
