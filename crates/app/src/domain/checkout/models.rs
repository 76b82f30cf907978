//! Checkout Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::{
    accounts::models::CheckoutContact,
    carts::models::{Cart, CartLine, LineItem},
    catalog::models::UnknownKind,
    checkout::errors::CheckoutError,
    coupons::models::{AppliedCoupon, total_discount},
    expansion::Expansion,
    fulfillment::FulfillmentReport,
    identity::models::ResolvedBuyer,
    orders::models::{
        Order, OrderItemType, OrderLine, ShippingAddress, SourceCollection, compute_total,
    },
};

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Pricing knobs for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub currency: String,

    /// Flat delivery charge in minor units.
    pub delivery_charge: u64,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            delivery_charge: 0,
        }
    }
}

/// Server-side price of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<CartLine>,
    pub subtotal: u64,
    pub shipping_cost: u64,
    pub applied_coupons: Vec<AppliedCoupon>,
    pub discount_total: u64,
    pub total_amount: u64,
}

impl Quote {
    /// Price a cart using the discounts frozen when its coupons were applied.
    #[must_use]
    pub fn for_cart(cart: &Cart, settings: &CheckoutSettings) -> Self {
        let subtotal = cart.subtotal();
        let discount_total = total_discount(&cart.coupons);

        Self {
            lines: cart.lines.clone(),
            subtotal,
            shipping_cost: settings.delivery_charge,
            applied_coupons: cart.coupons.clone(),
            discount_total,
            total_amount: compute_total(subtotal, settings.delivery_charge, discount_total),
        }
    }
}

/// Lifecycle of a checkout intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutIntentStatus {
    AwaitingPayment,
    Paid,
    Failed,
}

impl CheckoutIntentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "awaiting_payment",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for CheckoutIntentStatus {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for CheckoutIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gateway intent together with the quote it was created for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutIntent {
    pub gateway_intent_id: String,
    pub cart_key: String,
    pub status: CheckoutIntentStatus,
    pub quote: Quote,
    pub currency: String,
    pub created_at: Timestamp,
}

/// New Checkout Intent Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckoutIntent {
    pub gateway_intent_id: String,
    pub cart_key: String,
    pub quote: Quote,
    pub currency: String,
}

/// Fields the client relays from the gateway's checkout widget.
///
/// None of these are trusted: settlement is always confirmed with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentProof {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    #[serde(default)]
    pub gateway_signature: Option<String>,
}

/// Who is buying and where it ships.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub buyer_token: Option<String>,
    pub shipping_address: ShippingAddress,
}

impl CheckoutRequest {
    /// Contact details used to find or create the buyer's account.
    #[must_use]
    pub fn contact(&self) -> CheckoutContact {
        let address = &self.shipping_address;
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        CheckoutContact {
            name: non_empty(&address.full_name),
            email: non_empty(&address.email),
            phone: non_empty(&address.phone),
        }
    }

    /// Reject addresses a parcel could not be delivered to.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let address = &self.shipping_address;
        let required = [
            ("full_name", &address.full_name),
            ("email", &address.email),
            ("phone", &address.phone),
            ("address_line1", &address.address_line1),
            ("city", &address.city),
            ("zip_code", &address.zip_code),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CheckoutError::IncompleteAddress(*field)),
            None => Ok(()),
        }
    }
}

/// A committed order and the buyer it was committed for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: Order,
    pub buyer: ResolvedBuyer,

    /// `None` when nothing was fulfilled by this call.
    pub fulfillment: Option<FulfillmentReport>,

    /// The order already existed for this payment.
    pub replayed: bool,
}

impl PlacedOrder {
    /// An order found for an intent that was already verified.
    #[must_use]
    pub fn replayed(order: Order) -> Self {
        Self {
            buyer: ResolvedBuyer {
                account: order.account,
                is_new_account: false,
                session_token: None,
            },
            order,
            fulfillment: None,
            replayed: true,
        }
    }
}

/// Snapshot a cart line as it is, without expanding collections.
#[must_use]
pub fn snapshot_line(line: &CartLine) -> OrderLine {
    let item_type = match &line.item {
        LineItem::Item { .. } => OrderItemType::Item,
        LineItem::Collection { .. } => OrderItemType::Collection,
        LineItem::CustomDesign { .. } => OrderItemType::CustomDesign,
        LineItem::SuggestedItem { .. } => OrderItemType::SuggestedItem,
    };

    let collection = match &line.item {
        LineItem::Collection { collection } => Some(SourceCollection {
            uuid: *collection,
            name: line.name.clone(),
            image: line.image.clone(),
        }),
        LineItem::Item { .. } | LineItem::CustomDesign { .. } | LineItem::SuggestedItem { .. } => {
            None
        }
    };

    OrderLine {
        item_type,
        reference: line.item.reference(),
        collection,
        product_name: line.name.clone(),
        image: line.image.clone(),
        unit_price: line.unit_price,
        quantity: line.quantity,
        phone_model: line.variant.phone_model(),
        variant: line.variant.clone(),
        custom_design: line.item.design().cloned(),
    }
}

/// One order line per expanded card, each carrying its source collection.
#[must_use]
pub fn expanded_lines(line: &CartLine, expansion: &Expansion) -> Vec<OrderLine> {
    let source = SourceCollection {
        uuid: expansion.collection,
        name: expansion.collection_name.clone(),
        image: expansion.collection_image.clone(),
    };

    expansion
        .cards
        .iter()
        .map(|card| OrderLine {
            item_type: OrderItemType::Product,
            reference: card.product.into_uuid(),
            collection: Some(source.clone()),
            product_name: card.name.clone(),
            image: card.image.clone(),
            unit_price: card.unit_price,
            quantity: 1,
            phone_model: line.variant.phone_model(),
            variant: line.variant.clone(),
            custom_design: None,
        })
        .collect()
}
