//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, DatabaseHealth, Db},
    domain::{
        accounts::PgAccountsService,
        carts::{CartsService, PgCartsService},
        catalog::PgCatalogService,
        checkout::{
            CheckoutOrchestrator, CheckoutService, CheckoutServices, PgCheckoutIntentsService,
            models::CheckoutSettings,
        },
        coupons::PgCouponsService,
        expansion::CollectionExpansionResolver,
        fulfillment::FulfillmentUnlocker,
        identity::GuestIdentityResolver,
        orders::{OrdersService, PgOrdersService},
    },
    gateways::{
        payments::{RazorpayClient, RazorpayConfig},
        shipping::{IThinkClient, IThinkConfig},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Gateway and pricing configuration handed to the context.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub razorpay: RazorpayConfig,
    pub ithink: IThinkConfig,
    pub checkout: CheckoutSettings,
}

#[derive(Clone)]
pub struct AppContext {
    pub database: Arc<dyn DatabaseHealth>,
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, config: AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(&Db::new(pool), config))
    }

    /// Wire every service over one connection pool.
    #[must_use]
    pub fn from_db(db: &Db, config: AppConfig) -> Self {
        let catalog = Arc::new(PgCatalogService::new(db.clone()));
        let coupons = Arc::new(PgCouponsService::new(db.clone()));
        let accounts = Arc::new(PgAccountsService::new(db.clone()));
        let carts: Arc<dyn CartsService> = Arc::new(PgCartsService::new(
            db.clone(),
            catalog.clone(),
            coupons.clone(),
        ));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(
            db.clone(),
            Arc::new(IThinkClient::new(config.ithink)),
        ));

        let checkout = CheckoutOrchestrator::new(
            CheckoutServices {
                carts: carts.clone(),
                coupons,
                payments: Arc::new(RazorpayClient::new(config.razorpay)),
                intents: Arc::new(PgCheckoutIntentsService::new(db.clone())),
                identity: Arc::new(GuestIdentityResolver::new(accounts.clone())),
                expansion: Arc::new(CollectionExpansionResolver::new(catalog, accounts.clone())),
                orders: orders.clone(),
                fulfillment: Arc::new(FulfillmentUnlocker::new(accounts, carts.clone())),
            },
            config.checkout,
        );

        Self {
            database: Arc::new(db.clone()),
            carts,
            checkout: Arc::new(checkout),
            orders,
        }
    }
}
