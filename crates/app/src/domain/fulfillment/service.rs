//! Fulfillment Unlock Service
//!
//! Runs once an order is committed and paid for. Every step is best-effort:
//! the order is already the source of truth, so failures are logged and
//! reported rather than propagated.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    accounts::AccountsService,
    carts::CartsService,
    fulfillment::plan::UnlockPlan,
    orders::models::Order,
};

/// What fulfillment managed to do for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FulfillmentReport {
    pub products_unlocked: usize,
    pub collections_unlocked: usize,
    pub cards_granted: u32,
    pub score: Option<u64>,
    pub cart_cleared: bool,
    pub failures: Vec<String>,
}

impl FulfillmentReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct FulfillmentUnlocker {
    accounts: Arc<dyn AccountsService>,
    carts: Arc<dyn CartsService>,
}

impl fmt::Debug for FulfillmentUnlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FulfillmentUnlocker").finish_non_exhaustive()
    }
}

impl FulfillmentUnlocker {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountsService>, carts: Arc<dyn CartsService>) -> Self {
        Self { accounts, carts }
    }
}

#[async_trait]
impl FulfillmentService for FulfillmentUnlocker {
    async fn fulfill(&self, order: &Order, cart_key: &str) -> FulfillmentReport {
        let account = order.account;
        let plan = UnlockPlan::for_order(order);
        let mut report = FulfillmentReport::default();

        if !plan.products.is_empty() {
            let products = plan.products.len();

            match self.accounts.unlock(account, plan.products, Vec::new()).await {
                Ok(()) => report.products_unlocked = products,
                Err(error) => {
                    warn!(order = %order.order_number, %account, %error, "failed to unlock products");
                    report.failures.push(format!("products: {error}"));
                }
            }
        }

        if !plan.collections.is_empty() {
            let collections = plan.collections.len();

            match self.accounts.unlock(account, Vec::new(), plan.collections).await {
                Ok(()) => report.collections_unlocked = collections,
                Err(error) => {
                    warn!(order = %order.order_number, %account, %error, "failed to unlock collections");
                    report.failures.push(format!("collections: {error}"));
                }
            }
        }

        for grant in plan.grants {
            let collection = grant.collection;

            match self.accounts.grant_gaming_cards(account, grant).await {
                Ok(granted) => report.cards_granted = report.cards_granted.saturating_add(granted),
                Err(error) => {
                    warn!(
                        order = %order.order_number,
                        %account,
                        %collection,
                        %error,
                        "failed to grant gaming cards"
                    );
                    report
                        .failures
                        .push(format!("gaming cards for {collection}: {error}"));
                }
            }
        }

        match self.accounts.recalculate_score(account).await {
            Ok(score) => report.score = Some(score),
            Err(error) => {
                warn!(order = %order.order_number, %account, %error, "failed to recalculate score");
                report.failures.push(format!("score: {error}"));
            }
        }

        match self.carts.clear(cart_key).await {
            Ok(()) => report.cart_cleared = true,
            Err(error) => {
                warn!(order = %order.order_number, cart = cart_key, %error, "failed to clear cart");
                report.failures.push(format!("cart: {error}"));
            }
        }

        debug!(order = %order.order_number, ?report, "fulfilled order");

        report
    }
}

#[automock]
#[async_trait]
pub trait FulfillmentService: Send + Sync {
    /// Unlock purchased content, grant gaming cards, refresh the buyer's
    /// score, then clear the cart the order was placed from.
    async fn fulfill(&self, order: &Order, cart_key: &str) -> FulfillmentReport;
}
