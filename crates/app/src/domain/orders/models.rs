//! Order Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        accounts::models::AccountUuid,
        carts::models::{CustomDesign, Variant},
        catalog::models::{CollectionUuid, UnknownKind},
        coupons::models::AppliedCoupon,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Prefix of human-readable order numbers.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Default shipping country.
pub const DEFAULT_COUNTRY: &str = "India";

/// `ORD-{year}-{sequence:04}`
#[must_use]
pub fn format_order_number(year: i16, sequence: u64) -> String {
    format!("{ORDER_NUMBER_PREFIX}-{year}-{sequence:04}")
}

/// `subtotal + shipping - discounts`, floored at zero.
#[must_use]
pub fn compute_total(subtotal: u64, shipping_cost: u64, discount_total: u64) -> u64 {
    subtotal
        .saturating_add(shipping_cost)
        .saturating_sub(discount_total)
}

macro_rules! storage_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownKind;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(UnknownKind(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

storage_enum! {
    /// Order lifecycle state.
    pub enum OrderStatus {
        Quoted => "quoted",
        AwaitingPayment => "awaiting_payment",
        Paid => "paid",
        Failed => "failed",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        OutForDelivery => "out_for_delivery",
        Delivered => "delivered",
        Cancelled => "cancelled",
        Refunded => "refunded",
    }
}

impl OrderStatus {
    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Refunded)
    }

    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        !self.is_terminal() && !matches!(self, Self::Delivered)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Quoted, Self::AwaitingPayment)
            | (Self::AwaitingPayment, Self::Paid | Self::Failed)
            | (Self::Paid, Self::Confirmed)
            | (Self::Confirmed, Self::Processing)
            | (Self::Processing, Self::Shipped)
            | (Self::Shipped, Self::OutForDelivery)
            | (Self::OutForDelivery, Self::Delivered) => true,
            (from, Self::Cancelled) => from.is_cancellable(),
            (from, Self::Refunded) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Statuses that count towards the leaderboard.
    #[must_use]
    pub const fn is_fulfilled_or_active(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Processing | Self::Shipped | Self::OutForDelivery | Self::Delivered
        )
    }
}

storage_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
        PartiallyRefunded => "partially_refunded",
    }
}

storage_enum! {
    pub enum PaymentMethod {
        Gateway => "gateway",
        CashOnDelivery => "cash_on_delivery",
    }
}

storage_enum! {
    /// Who caused a status change.
    pub enum Actor {
        Customer => "customer",
        Admin => "admin",
        System => "system",
    }
}

storage_enum! {
    /// Kind of an order line.
    ///
    /// `Product` lines were expanded from a collection purchase; `Collection`
    /// lines are collection purchases recorded unexpanded.
    pub enum OrderItemType {
        Item => "item",
        Product => "product",
        Collection => "collection",
        CustomDesign => "custom_design",
        SuggestedItem => "suggested_item",
    }
}

/// Shipping address snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// The collection an order line came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCollection {
    pub uuid: CollectionUuid,
    pub name: String,
    pub image: Option<String>,
}

/// Immutable order line snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_type: OrderItemType,
    pub reference: Uuid,
    pub collection: Option<SourceCollection>,
    pub product_name: String,
    pub image: Option<String>,
    pub unit_price: u64,
    pub quantity: u32,
    pub phone_model: String,
    pub variant: Variant,
    pub custom_design: Option<CustomDesign>,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        line_points(self.item_type, self.collection.is_some())
    }
}

/// One status history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub note: String,
    pub actor: Actor,
    pub recorded_at: Timestamp,
}

/// External shipment booked for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub awb_code: String,
    pub shipment_id: Option<String>,
    pub courier_name: Option<String>,
}

/// Manually entered tracking details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub tracking_number: Option<String>,
    pub tracking_link: Option<String>,
    pub courier_name: Option<String>,
}

/// Order Model
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub account: AccountUuid,
    pub lines: Vec<OrderLine>,
    pub subtotal: u64,
    pub shipping_cost: u64,
    pub discount_total: u64,
    pub total_amount: u64,
    pub applied_coupons: Vec<AppliedCoupon>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub gateway_intent_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub shipping_address: ShippingAddress,
    pub shipment: Option<ShipmentRecord>,
    pub tracking: Tracking,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Actor>,
    pub history: Vec<StatusEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Order Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub account: AccountUuid,
    pub lines: Vec<OrderLine>,
    pub subtotal: u64,
    pub shipping_cost: u64,
    pub applied_coupons: Vec<AppliedCoupon>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub gateway_intent_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub shipping_address: ShippingAddress,
    pub note: String,
}

impl NewOrder {
    #[must_use]
    pub fn discount_total(&self) -> u64 {
        self.applied_coupons
            .iter()
            .fold(0_u64, |sum, coupon| sum.saturating_add(coupon.discount_amount))
    }

    #[must_use]
    pub fn total_amount(&self) -> u64 {
        compute_total(self.subtotal, self.shipping_cost, self.discount_total())
    }
}

/// Leaderboard points: collection purchases are worth double.
#[must_use]
pub fn line_points(item_type: OrderItemType, from_collection: bool) -> u64 {
    if from_collection || item_type == OrderItemType::Collection {
        2
    } else {
        1
    }
}

/// One counted order line, as read for the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardLine {
    pub account: AccountUuid,
    pub username: String,
    pub order: OrderUuid,
    pub item_type: OrderItemType,
    pub from_collection: bool,
}

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub account: AccountUuid,
    pub username: String,
    pub points: u64,
    pub orders: u64,
}

/// Aggregate counted lines per account, highest points first.
///
/// Ties break on order count, then username.
#[must_use]
pub fn rank_leaderboard(lines: Vec<LeaderboardLine>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut accounts: FxHashMap<AccountUuid, (String, u64, FxHashSet<OrderUuid>)> =
        FxHashMap::default();

    for line in lines {
        let entry = accounts
            .entry(line.account)
            .or_insert_with(|| (line.username.clone(), 0, FxHashSet::default()));

        entry.1 = entry
            .1
            .saturating_add(line_points(line.item_type, line.from_collection));
        entry.2.insert(line.order);
    }

    let mut ranked: Vec<LeaderboardEntry> = accounts
        .into_iter()
        .map(|(account, (username, points, orders))| LeaderboardEntry {
            account,
            username,
            points,
            orders: u64::try_from(orders.len()).unwrap_or(u64::MAX),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.orders.cmp(&a.orders))
            .then_with(|| a.username.cmp(&b.username))
    });
    ranked.truncate(limit);

    ranked
}
