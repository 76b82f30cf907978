//! Test context for service-level integration tests.

use std::sync::Arc;

use testresult::TestResult;

use crate::{
    domain::{
        accounts::PgAccountsService, checkout::PgCheckoutIntentsService,
        coupons::PgCouponsService, orders::PgOrdersService,
    },
    gateways::shipping::MockShipmentDispatcher,
};

use super::db::TestDb;

#[derive(Debug)]
pub(crate) struct TestContext {
    pub(crate) db: TestDb,
    pub(crate) accounts: PgAccountsService,
    pub(crate) coupons: PgCouponsService,
    pub(crate) intents: PgCheckoutIntentsService,
    pub(crate) orders: PgOrdersService,
}

impl TestContext {
    pub(crate) async fn new() -> TestResult<Self> {
        Self::with_dispatcher(MockShipmentDispatcher::new()).await
    }

    /// Context whose orders service books parcels through `dispatcher`.
    pub(crate) async fn with_dispatcher(dispatcher: MockShipmentDispatcher) -> TestResult<Self> {
        let test_db = TestDb::new().await?;
        let db = test_db.db();

        Ok(Self {
            accounts: PgAccountsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            intents: PgCheckoutIntentsService::new(db.clone()),
            orders: PgOrdersService::new(db, Arc::new(dispatcher)),
            db: test_db,
        })
    }
}
