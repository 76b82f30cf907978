//! Checkout Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    checkout::models::{CheckoutIntent, CheckoutRequest, PaymentProof, PlacedOrder, Quote},
    fulfillment::FulfillmentReport,
};

use crate::{
    carts::models::{AppliedCouponResponse, CartLineResponse},
    orders::models::{OrderResponse, ShippingAddressPayload},
};

/// Cart Key Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartKeyRequest {
    /// Buyer key of the cart to check out
    pub cart_key: String,
}

fn checkout_request(
    buyer_token: Option<String>,
    shipping_address: ShippingAddressPayload,
) -> CheckoutRequest {
    CheckoutRequest {
        buyer_token,
        shipping_address: shipping_address.into(),
    }
}

/// Verify Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyPaymentRequest {
    /// Gateway intent id returned by the intent endpoint
    pub intent_id: String,

    /// Order id relayed from the gateway widget
    pub gateway_order_id: String,

    /// Payment id relayed from the gateway widget
    pub gateway_payment_id: String,

    /// Signature relayed from the gateway widget
    #[serde(default)]
    pub gateway_signature: Option<String>,

    /// Session token of a signed-in buyer
    #[serde(default)]
    pub buyer_token: Option<String>,

    /// Delivery address, also used to find or create the account
    pub shipping_address: ShippingAddressPayload,
}

impl VerifyPaymentRequest {
    pub(crate) fn into_parts(self) -> (String, PaymentProof, CheckoutRequest) {
        (
            self.intent_id,
            PaymentProof {
                gateway_order_id: self.gateway_order_id,
                gateway_payment_id: self.gateway_payment_id,
                gateway_signature: self.gateway_signature,
            },
            checkout_request(self.buyer_token, self.shipping_address),
        )
    }
}

/// Cash On Delivery Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CashOnDeliveryRequest {
    /// Buyer key of the cart to check out
    pub cart_key: String,

    /// Session token of a signed-in buyer
    #[serde(default)]
    pub buyer_token: Option<String>,

    /// Delivery address, also used to find or create the account
    pub shipping_address: ShippingAddressPayload,
}

impl CashOnDeliveryRequest {
    pub(crate) fn into_parts(self) -> (String, CheckoutRequest) {
        (
            self.cart_key,
            checkout_request(self.buyer_token, self.shipping_address),
        )
    }
}

/// Quote Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteResponse {
    /// Always `true`
    pub success: bool,

    /// Priced lines
    pub lines: Vec<CartLineResponse>,

    /// Applied coupons with their frozen discounts
    pub coupons: Vec<AppliedCouponResponse>,

    /// Sum of line totals
    pub subtotal: u64,

    /// Delivery charge
    pub shipping_cost: u64,

    /// Sum of coupon discounts
    pub discount_total: u64,

    /// Amount the buyer pays
    pub total_amount: u64,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            success: true,
            lines: quote.lines.into_iter().map(CartLineResponse::from).collect(),
            coupons: quote
                .applied_coupons
                .into_iter()
                .map(AppliedCouponResponse::from)
                .collect(),
            subtotal: quote.subtotal,
            shipping_cost: quote.shipping_cost,
            discount_total: quote.discount_total,
            total_amount: quote.total_amount,
        }
    }
}

/// Checkout Intent Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutIntentResponse {
    /// Always `true`
    pub success: bool,

    /// Gateway intent id to open the payment widget with
    pub intent_id: String,

    /// Cart the intent was priced from
    pub cart_key: String,

    /// Intent status
    pub status: String,

    /// Amount in minor units
    pub amount: u64,

    /// ISO currency code
    pub currency: String,

    /// Creation time
    pub created_at: String,
}

impl From<CheckoutIntent> for CheckoutIntentResponse {
    fn from(intent: CheckoutIntent) -> Self {
        Self {
            success: true,
            status: intent.status.to_string(),
            amount: intent.quote.total_amount,
            intent_id: intent.gateway_intent_id,
            cart_key: intent.cart_key,
            currency: intent.currency,
            created_at: intent.created_at.to_string(),
        }
    }
}

/// Fulfillment Summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FulfillmentSummary {
    /// Products newly unlocked for the buyer
    pub products_unlocked: usize,

    /// Collections newly unlocked for the buyer
    pub collections_unlocked: usize,

    /// Cards granted by collection purchases
    pub cards_granted: u32,

    /// Buyer's recalculated score
    pub score: Option<u64>,

    /// Whether the cart was emptied
    pub cart_cleared: bool,

    /// Steps that did not complete
    pub failures: Vec<String>,
}

impl From<FulfillmentReport> for FulfillmentSummary {
    fn from(report: FulfillmentReport) -> Self {
        Self {
            products_unlocked: report.products_unlocked,
            collections_unlocked: report.collections_unlocked,
            cards_granted: report.cards_granted,
            score: report.score,
            cart_cleared: report.cart_cleared,
            failures: report.failures,
        }
    }
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    /// Whether an order exists for this checkout
    pub success: bool,

    /// Human readable outcome
    pub message: String,

    /// The placed order
    pub order: Option<OrderResponse>,

    /// Buyer account the order belongs to
    pub account: Option<Uuid>,

    /// The account was created by this checkout
    #[serde(default)]
    pub is_new_account: bool,

    /// Session token for a newly created account
    pub session_token: Option<String>,

    /// The order already existed for this payment
    #[serde(default)]
    pub replayed: bool,

    /// What fulfillment did, when it ran
    pub fulfillment: Option<FulfillmentSummary>,
}

impl CheckoutResponse {
    pub(crate) fn placed(placed: PlacedOrder, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            account: Some(placed.buyer.account.into_uuid()),
            is_new_account: placed.buyer.is_new_account,
            session_token: placed.buyer.session_token,
            replayed: placed.replayed,
            fulfillment: placed.fulfillment.map(FulfillmentSummary::from),
            order: Some(placed.order.into()),
        }
    }

    pub(crate) fn not_completed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            order: None,
            account: None,
            is_new_account: false,
            session_token: None,
            replayed: false,
            fulfillment: None,
        }
    }
}
