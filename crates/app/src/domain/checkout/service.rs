//! Checkout orchestration.
//!
//! A gateway checkout runs in two calls. `create_intent` prices the server-side
//! cart and opens a gateway intent of that size; no order exists yet.
//! `verify` confirms settlement with the gateway and only then resolves the
//! buyer, expands collection lines, redeems coupons, commits the order and
//! fulfills it. The unique gateway intent id on orders makes `verify` safe to
//! call repeatedly.
//!
//! Cash-on-delivery orders skip the gateway and are committed straight away
//! with their payment pending.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        accounts::models::AccountUuid,
        carts::{
            CartsService,
            models::{CartLine, LineItem},
        },
        checkout::{
            errors::CheckoutError,
            intents::CheckoutIntentsService,
            models::{
                CheckoutIntent, CheckoutIntentStatus, CheckoutRequest, CheckoutSettings,
                NewCheckoutIntent, PaymentProof, PlacedOrder, Quote, expanded_lines,
                snapshot_line,
            },
        },
        coupons::{
            CouponsService,
            models::{AppliedCoupon, Redemption},
        },
        expansion::{ExpansionError, ExpansionService},
        fulfillment::FulfillmentService,
        identity::IdentityService,
        orders::{
            OrdersService, OrdersServiceError,
            models::{
                NewOrder, Order, OrderLine, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus,
            },
        },
    },
    gateways::payments::{IntentStatus, PaymentGateway},
};

/// Collaborators the orchestrator drives.
pub struct CheckoutServices {
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub payments: Arc<dyn PaymentGateway>,
    pub intents: Arc<dyn CheckoutIntentsService>,
    pub identity: Arc<dyn IdentityService>,
    pub expansion: Arc<dyn ExpansionService>,
    pub orders: Arc<dyn OrdersService>,
    pub fulfillment: Arc<dyn FulfillmentService>,
}

impl fmt::Debug for CheckoutServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutServices").finish_non_exhaustive()
    }
}

enum Committed {
    Placed(Order),
    Existing(Order),
}

#[derive(Debug)]
pub struct CheckoutOrchestrator {
    services: CheckoutServices,
    settings: CheckoutSettings,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(services: CheckoutServices, settings: CheckoutSettings) -> Self {
        Self { services, settings }
    }

    /// Order lines for a priced cart, with collection lines expanded into cards.
    ///
    /// A collection that is gone or has nothing to grant is recorded as the raw
    /// collection line so the sale is not lost.
    async fn order_lines(
        &self,
        lines: &[CartLine],
        account: AccountUuid,
    ) -> Result<Vec<OrderLine>, CheckoutError> {
        let mut order_lines = Vec::with_capacity(lines.len());

        for line in lines {
            let collection = match &line.item {
                LineItem::Collection { collection } => *collection,
                LineItem::Item { .. }
                | LineItem::CustomDesign { .. }
                | LineItem::SuggestedItem { .. } => {
                    order_lines.push(snapshot_line(line));
                    continue;
                }
            };

            match self
                .services
                .expansion
                .expand(collection, line.quantity, line.line_total(), account)
                .await
            {
                Ok(expansion) => order_lines.extend(expanded_lines(line, &expansion)),
                Err(error @ (ExpansionError::NotFound | ExpansionError::NoEligibleMembers)) => {
                    warn!(%collection, %error, "recording collection line unexpanded");
                    order_lines.push(snapshot_line(line));
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(order_lines)
    }

    /// Count each applied coupon once for `reference`. The discounts were
    /// frozen when applied, so a failed redemption never changes the order.
    async fn redeem_coupons(&self, coupons: &[AppliedCoupon], reference: &str) {
        for coupon in coupons {
            match self.services.coupons.redeem(&coupon.code, reference).await {
                Ok(Redemption::Redeemed) => {
                    debug!(code = %coupon.code, reference, "redeemed coupon");
                }
                Ok(Redemption::AlreadyRedeemed) => {
                    debug!(code = %coupon.code, reference, "coupon already redeemed");
                }
                Err(error) => {
                    warn!(code = %coupon.code, reference, %error, "failed to redeem coupon");
                }
            }
        }
    }

    async fn mark_intent(&self, intent_id: &str, status: CheckoutIntentStatus) {
        if let Err(error) = self.services.intents.set_status(intent_id, status).await {
            warn!(intent = intent_id, %status, %error, "failed to update checkout intent");
        }
    }

    /// Commit a verified order; losing a race to a concurrent verify of the
    /// same intent yields the winner's order.
    async fn commit_verified(
        &self,
        order: NewOrder,
        intent_id: &str,
    ) -> Result<Committed, CheckoutError> {
        match self.services.orders.commit(order).await {
            Ok(order) => Ok(Committed::Placed(order)),
            Err(OrdersServiceError::AlreadyExists) => {
                match self.services.orders.find_by_intent(intent_id).await? {
                    Some(existing) => Ok(Committed::Existing(existing)),
                    None => Err(OrdersServiceError::AlreadyExists.into()),
                }
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait]
impl CheckoutService for CheckoutOrchestrator {
    async fn quote(&self, cart_key: &str) -> Result<Quote, CheckoutError> {
        let cart = self.services.carts.get_cart(cart_key).await?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Quote::for_cart(&cart, &self.settings))
    }

    async fn create_intent(&self, cart_key: &str) -> Result<CheckoutIntent, CheckoutError> {
        let quote = self.quote(cart_key).await?;
        let receipt = format!("rcpt_{}", Timestamp::now().as_millisecond());

        let intent = self
            .services
            .payments
            .create_intent(quote.total_amount, &self.settings.currency, &receipt)
            .await?;

        let created = self
            .services
            .intents
            .create_intent(NewCheckoutIntent {
                gateway_intent_id: intent.id,
                cart_key: cart_key.to_string(),
                quote,
                currency: intent.currency,
            })
            .await?;

        info!(
            intent = %created.gateway_intent_id,
            amount = created.quote.total_amount,
            "created checkout intent"
        );

        Ok(created)
    }

    async fn verify(
        &self,
        intent_id: &str,
        proof: PaymentProof,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        if proof.gateway_order_id != intent_id {
            return Err(CheckoutError::ProofMismatch);
        }

        request.validate()?;

        let intent = self.services.intents.get_intent(intent_id).await?;

        if let Some(existing) = self.services.orders.find_by_intent(intent_id).await? {
            debug!(intent = intent_id, order = %existing.uuid, "intent already verified");
            return Ok(PlacedOrder::replayed(existing));
        }

        match self.services.payments.fetch_intent_status(intent_id).await? {
            IntentStatus::Settled => {}
            IntentStatus::Pending => {
                return Err(CheckoutError::PaymentNotCompleted(IntentStatus::Pending));
            }
            IntentStatus::Failed => {
                self.mark_intent(intent_id, CheckoutIntentStatus::Failed).await;
                return Err(CheckoutError::PaymentNotCompleted(IntentStatus::Failed));
            }
        }

        let buyer = self
            .services
            .identity
            .resolve(request.buyer_token.clone(), request.contact())
            .await?;

        let quote = intent.quote;
        let lines = self.order_lines(&quote.lines, buyer.account).await?;

        self.redeem_coupons(&quote.applied_coupons, intent_id).await;

        let committed = self
            .commit_verified(
                NewOrder {
                    uuid: OrderUuid::new(),
                    account: buyer.account,
                    lines,
                    subtotal: quote.subtotal,
                    shipping_cost: quote.shipping_cost,
                    applied_coupons: quote.applied_coupons,
                    status: OrderStatus::Confirmed,
                    payment_method: PaymentMethod::Gateway,
                    payment_status: PaymentStatus::Paid,
                    gateway_intent_id: Some(intent_id.to_string()),
                    gateway_payment_id: Some(proof.gateway_payment_id),
                    shipping_address: request.shipping_address,
                    note: "Payment verified".to_string(),
                },
                intent_id,
            )
            .await?;

        let order = match committed {
            Committed::Placed(order) => order,
            Committed::Existing(existing) => return Ok(PlacedOrder::replayed(existing)),
        };

        self.mark_intent(intent_id, CheckoutIntentStatus::Paid).await;

        let report = self
            .services
            .fulfillment
            .fulfill(&order, &intent.cart_key)
            .await;

        info!(
            order = %order.uuid,
            order_number = %order.order_number,
            account = %buyer.account,
            new_account = buyer.is_new_account,
            "placed gateway order"
        );

        Ok(PlacedOrder {
            order,
            buyer,
            fulfillment: Some(report),
            replayed: false,
        })
    }

    async fn place_cash_on_delivery(
        &self,
        cart_key: &str,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        request.validate()?;

        let quote = self.quote(cart_key).await?;

        let buyer = self
            .services
            .identity
            .resolve(request.buyer_token.clone(), request.contact())
            .await?;

        let lines = self.order_lines(&quote.lines, buyer.account).await?;

        let order = self
            .services
            .orders
            .commit(NewOrder {
                uuid: OrderUuid::new(),
                account: buyer.account,
                lines,
                subtotal: quote.subtotal,
                shipping_cost: quote.shipping_cost,
                applied_coupons: quote.applied_coupons,
                status: OrderStatus::Confirmed,
                payment_method: PaymentMethod::CashOnDelivery,
                payment_status: PaymentStatus::Pending,
                gateway_intent_id: None,
                gateway_payment_id: None,
                shipping_address: request.shipping_address,
                note: "Cash on delivery order placed".to_string(),
            })
            .await?;

        self.redeem_coupons(&order.applied_coupons, &order.uuid.to_string())
            .await;

        if let Err(error) = self.services.carts.clear(cart_key).await {
            warn!(order = %order.uuid, cart = cart_key, %error, "failed to clear cart");
        }

        info!(
            order = %order.uuid,
            order_number = %order.order_number,
            account = %buyer.account,
            "placed cash on delivery order"
        );

        Ok(PlacedOrder {
            order,
            buyer,
            fulfillment: None,
            replayed: false,
        })
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Price the current server-side cart.
    async fn quote(&self, cart_key: &str) -> Result<Quote, CheckoutError>;

    /// Open a gateway intent sized to the current cart.
    async fn create_intent(&self, cart_key: &str) -> Result<CheckoutIntent, CheckoutError>;

    /// Confirm an intent settled and turn it into a fulfilled order.
    ///
    /// Calling this again for a verified intent returns the existing order.
    async fn verify(
        &self,
        intent_id: &str,
        proof: PaymentProof,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError>;

    /// Commit a cash-on-delivery order for the current cart.
    async fn place_cash_on_delivery(
        &self,
        cart_key: &str,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError>;
}
