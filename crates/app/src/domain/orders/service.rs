//! Orders service.
//!
//! The ledger of committed orders. Orders are written once, when payment is
//! confirmed or a cash-on-delivery order is placed; afterwards only status,
//! tracking and shipment columns change, and every status change appends to
//! the order's history.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::{Timestamp, tz::TimeZone};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        accounts::models::AccountUuid,
        orders::{
            errors::OrdersServiceError,
            models::{
                Actor, LeaderboardEntry, NewOrder, ORDER_NUMBER_PREFIX, Order, OrderStatus,
                OrderUuid, PaymentMethod, PaymentStatus, ShipmentRecord, Tracking,
                format_order_number, rank_leaderboard,
            },
            repository::{PgOrdersRepository, StatusChange},
        },
    },
    gateways::shipping::{
        Recipient, ShipmentDispatcher, ShipmentItem, ShipmentRequest, TrackingStatus,
    },
};

/// Statuses whose orders count towards the leaderboard.
const LEADERBOARD_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
    dispatcher: Arc<dyn ShipmentDispatcher>,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, dispatcher: Arc<dyn ShipmentDispatcher>) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
            dispatcher,
        }
    }

    async fn hydrate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: Order,
    ) -> Result<Order, sqlx::Error> {
        order.lines = self.repository.list_lines(tx, order.uuid).await?;
        order.history = self.repository.list_history(tx, order.uuid).await?;

        Ok(order)
    }

    async fn hydrate_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: Vec<Order>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let mut hydrated = Vec::with_capacity(orders.len());

        for order in orders {
            hydrated.push(self.hydrate(tx, order).await?);
        }

        Ok(hydrated)
    }

    async fn record_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        note: &str,
        actor: Actor,
        change: StatusChange<'_>,
    ) -> Result<(), OrdersServiceError> {
        if self.repository.update_status(tx, order, status, change).await? == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        self.repository
            .insert_status_entry(tx, order, status, note, actor)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn commit(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_order_numbering().await?;

        let year = Timestamp::now().to_zoned(TimeZone::UTC).year();
        let prefix = format!("{ORDER_NUMBER_PREFIX}-{year}-");
        let sequence = self
            .repository
            .last_sequence(&mut tx, &prefix)
            .await?
            .saturating_add(1);
        let order_number = format_order_number(year, sequence);

        self.repository
            .insert_order(&mut tx, &order_number, &order)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            self.repository
                .insert_line(&mut tx, order.uuid, position, line)
                .await?;
        }

        self.repository
            .insert_status_entry(&mut tx, order.uuid, order.status, &order.note, Actor::System)
            .await?;

        let committed = self.repository.get_order(&mut tx, order.uuid).await?;
        let committed = self.hydrate(&mut tx, committed).await?;

        tx.commit().await?;

        info!(
            order = %committed.uuid,
            order_number = %committed.order_number,
            total = committed.total_amount,
            "committed order"
        );

        Ok(committed)
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let found = match self.repository.find_by_intent(&mut tx, intent_id).await? {
            Some(order) => Some(self.hydrate(&mut tx, order).await?),
            None => None,
        };

        tx.commit().await?;

        Ok(found)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let found = self.repository.get_order(&mut tx, order).await?;
        let found = self.hydrate(&mut tx, found).await?;

        tx.commit().await?;

        Ok(found)
    }

    async fn list_for_buyer(&self, account: AccountUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_for_account(&mut tx, account).await?;
        let orders = self.hydrate_all(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_for_email(&self, email: &str) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self
            .repository
            .list_for_email(&mut tx, email.trim())
            .await?;
        let orders = self.hydrate_all(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        note: &str,
        actor: Actor,
    ) -> Result<Order, OrdersServiceError> {
        if status == OrderStatus::Cancelled {
            return self.cancel(order, note, actor).await;
        }

        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let change = StatusChange {
            payment_status: payment_status_after(&current, status),
            ..StatusChange::default()
        };

        self.record_status(&mut tx, order, status, note, actor, change)
            .await?;

        let updated = self.repository.get_order(&mut tx, order).await?;
        let updated = self.hydrate(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%order, from = %current.status, to = %status, %actor, "order status changed");

        Ok(updated)
    }

    async fn update_tracking(
        &self,
        order: OrderUuid,
        tracking: Tracking,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        if self
            .repository
            .update_tracking(&mut tx, order, &tracking)
            .await?
            == 0
        {
            return Err(OrdersServiceError::NotFound);
        }

        let updated = self.repository.get_order(&mut tx, order).await?;
        let updated = self.hydrate(&mut tx, updated).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn cancel(
        &self,
        order: OrderUuid,
        reason: &str,
        actor: Actor,
    ) -> Result<Order, OrdersServiceError> {
        let current = self.get_order(order).await?;

        if !current.status.is_cancellable() {
            return Err(OrdersServiceError::NotCancellable(current.status));
        }

        let mut shipment_cancelled = false;

        if let Some(shipment) = &current.shipment {
            match self.dispatcher.cancel_shipment(&shipment.awb_code).await {
                Ok(()) => shipment_cancelled = true,
                Err(error) => {
                    warn!(%order, awb = %shipment.awb_code, %error, "failed to cancel shipment");
                }
            }
        }

        let mut tx = self.db.begin().await?;

        let locked = self.repository.lock_order(&mut tx, order).await?;

        if !locked.status.is_cancellable() {
            return Err(OrdersServiceError::NotCancellable(locked.status));
        }

        let change = StatusChange {
            payment_status: None,
            cancellation_reason: Some(reason),
            cancelled_by: Some(actor),
        };

        self.record_status(&mut tx, order, OrderStatus::Cancelled, reason, actor, change)
            .await?;

        if shipment_cancelled {
            self.repository.clear_shipment(&mut tx, order).await?;
        }

        let cancelled = self.repository.get_order(&mut tx, order).await?;
        let cancelled = self.hydrate(&mut tx, cancelled).await?;

        tx.commit().await?;

        info!(%order, %actor, "order cancelled");

        Ok(cancelled)
    }

    async fn delete(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if current.status != OrderStatus::Delivered {
            return Err(OrdersServiceError::NotDeletable(current.status));
        }

        self.repository.delete_order(&mut tx, order).await?;

        tx.commit().await?;

        info!(%order, order_number = %current.order_number, "deleted delivered order");

        Ok(())
    }

    async fn create_shipment(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let current = self.get_order(order).await?;

        if current.shipment.is_some() {
            return Err(OrdersServiceError::ShipmentExists);
        }

        if current.status.is_terminal() {
            return Err(OrdersServiceError::Closed(current.status));
        }

        let shipment = self
            .dispatcher
            .create_shipment(&shipment_request(&current))
            .await?;

        let record = ShipmentRecord {
            awb_code: shipment.awb_code,
            shipment_id: shipment.shipment_id,
            courier_name: shipment.courier_name,
        };

        let mut tx = self.db.begin().await?;

        self.repository.set_shipment(&mut tx, order, &record).await?;

        let updated = self.repository.get_order(&mut tx, order).await?;
        let updated = self.hydrate(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%order, awb = %record.awb_code, "shipment created");

        Ok(updated)
    }

    async fn cancel_shipment(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let current = self.get_order(order).await?;

        let shipment = current.shipment.ok_or(OrdersServiceError::NoShipment)?;

        self.dispatcher.cancel_shipment(&shipment.awb_code).await?;

        let mut tx = self.db.begin().await?;

        self.repository.clear_shipment(&mut tx, order).await?;

        let updated = self.repository.get_order(&mut tx, order).await?;
        let updated = self.hydrate(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%order, awb = %shipment.awb_code, "shipment cancelled");

        Ok(updated)
    }

    async fn track_shipment(&self, order: OrderUuid) -> Result<TrackingStatus, OrdersServiceError> {
        let current = self.get_order(order).await?;

        let shipment = current.shipment.ok_or(OrdersServiceError::NoShipment)?;

        Ok(self.dispatcher.track_shipment(&shipment.awb_code).await?)
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let lines = self
            .repository
            .list_leaderboard_lines(&mut tx, &LEADERBOARD_STATUSES)
            .await?;

        tx.commit().await?;

        Ok(rank_leaderboard(lines, limit))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Persist a new order with the next order number for the current year.
    async fn commit(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// The order created for a gateway intent, if any.
    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Order>, OrdersServiceError>;

    /// Retrieve an order with its lines and history.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Orders placed by an account, newest first.
    async fn list_for_buyer(&self, account: AccountUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Orders shipped to an email address, newest first.
    async fn list_for_email(&self, email: &str) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order along its lifecycle.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        note: &str,
        actor: Actor,
    ) -> Result<Order, OrdersServiceError>;

    /// Store manually entered tracking details.
    async fn update_tracking(
        &self,
        order: OrderUuid,
        tracking: Tracking,
    ) -> Result<Order, OrdersServiceError>;

    /// Cancel an order, cancelling its shipment first when one exists.
    async fn cancel(
        &self,
        order: OrderUuid,
        reason: &str,
        actor: Actor,
    ) -> Result<Order, OrdersServiceError>;

    /// Remove a delivered order.
    async fn delete(&self, order: OrderUuid) -> Result<(), OrdersServiceError>;

    /// Book a shipment for an order.
    async fn create_shipment(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Cancel an order's shipment.
    async fn cancel_shipment(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Current tracking state of an order's shipment.
    async fn track_shipment(&self, order: OrderUuid) -> Result<TrackingStatus, OrdersServiceError>;

    /// Accounts ranked by points earned across active and delivered orders.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, OrdersServiceError>;
}

/// Payment status implied by moving `order` to `next`.
fn payment_status_after(order: &Order, next: OrderStatus) -> Option<PaymentStatus> {
    match next {
        OrderStatus::Refunded => Some(PaymentStatus::Refunded),
        OrderStatus::Failed => Some(PaymentStatus::Failed),
        OrderStatus::Paid => Some(PaymentStatus::Paid),
        OrderStatus::Delivered if order.payment_method == PaymentMethod::CashOnDelivery => {
            Some(PaymentStatus::Paid)
        }
        _ => None,
    }
}

/// Dispatcher request for an order snapshot.
pub(crate) fn shipment_request(order: &Order) -> ShipmentRequest {
    let address = &order.shipping_address;

    ShipmentRequest {
        order_number: order.order_number.clone(),
        order_date: order.created_at.to_zoned(TimeZone::UTC).date(),
        recipient: Recipient {
            name: address.full_name.clone(),
            phone: address.phone.clone(),
            email: address.email.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.zip_code.clone(),
            country: address.country.clone(),
        },
        items: order
            .lines
            .iter()
            .map(|line| ShipmentItem {
                name: line.product_name.clone(),
                sku: line.reference.to_string(),
                units: line.quantity,
                selling_price: line.unit_price,
            })
            .collect(),
        cash_on_delivery: order.payment_method == PaymentMethod::CashOnDelivery,
        sub_total: order.subtotal,
        shipping_charges: order.shipping_cost,
        total_discount: order.discount_total,
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::Date;
    use mockall::Sequence;
    use sqlx::query;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        domain::orders::models::OrderItemType,
        gateways::shipping::{MockShipmentDispatcher, Shipment, ShipmentError},
        test::{TestContext, fixtures, helpers},
    };

    use super::*;

    fn this_year() -> i16 {
        Timestamp::now().to_zoned(TimeZone::UTC).year()
    }

    fn booked(awb_code: &str) -> Shipment {
        Shipment {
            awb_code: awb_code.to_string(),
            shipment_id: Some("SHP-1".to_string()),
            courier_name: Some("Delhivery".to_string()),
        }
    }

    fn order(payment_method: PaymentMethod) -> Order {
        let mut line = fixtures::order_line(OrderItemType::Item, Uuid::nil(), None);
        line.product_name = "Carbon Wrap".to_string();
        line.quantity = 2;

        fixtures::order(payment_method, vec![line])
    }

    #[test]
    fn shipment_request_snapshots_the_order() {
        let order = order(PaymentMethod::CashOnDelivery);

        let request = shipment_request(&order);

        assert_eq!(request.order_number, "ORD-2026-0003");
        assert_eq!(request.order_date, Date::constant(1970, 1, 1));
        assert_eq!(request.recipient.pincode, "560001");
        assert_eq!(request.total_units(), 2);
        assert!(request.cash_on_delivery);
        assert_eq!(request.sub_total, 99_800);
    }

    #[test]
    fn delivering_cash_orders_marks_them_paid() {
        assert_eq!(
            payment_status_after(&order(PaymentMethod::CashOnDelivery), OrderStatus::Delivered),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(
            payment_status_after(&order(PaymentMethod::Gateway), OrderStatus::Delivered),
            None
        );
        assert_eq!(
            payment_status_after(&order(PaymentMethod::Gateway), OrderStatus::Refunded),
            Some(PaymentStatus::Refunded)
        );
    }

    #[tokio::test]
    async fn order_numbers_count_up_within_the_year() -> TestResult {
        let ctx = TestContext::new().await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;

        let first = ctx.orders.commit(helpers::new_order(account, None)).await?;
        let second = ctx.orders.commit(helpers::new_order(account, None)).await?;

        assert_eq!(first.order_number, format_order_number(this_year(), 1));
        assert_eq!(second.order_number, format_order_number(this_year(), 2));
        assert_eq!(second.lines.len(), 1);
        assert_eq!(second.history.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn numbering_ignores_other_years() -> TestResult {
        let ctx = TestContext::new().await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;

        let old = ctx.orders.commit(helpers::new_order(account, None)).await?;

        query("UPDATE orders SET order_number = 'ORD-2019-0042' WHERE uuid = $1")
            .bind(old.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await?;

        let fresh = ctx.orders.commit(helpers::new_order(account, None)).await?;

        assert_eq!(fresh.order_number, format_order_number(this_year(), 1));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_commits_get_distinct_numbers() -> TestResult {
        let ctx = TestContext::new().await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;

        let (a, b, c, d) = tokio::join!(
            ctx.orders.commit(helpers::new_order(account, None)),
            ctx.orders.commit(helpers::new_order(account, None)),
            ctx.orders.commit(helpers::new_order(account, None)),
            ctx.orders.commit(helpers::new_order(account, None)),
        );

        let mut numbers = vec![
            a?.order_number,
            b?.order_number,
            c?.order_number,
            d?.order_number,
        ];
        numbers.sort();

        let expected: Vec<String> = (1..=4)
            .map(|sequence| format_order_number(this_year(), sequence))
            .collect();

        assert_eq!(numbers, expected);

        Ok(())
    }

    #[tokio::test]
    async fn an_intent_backs_at_most_one_order() -> TestResult {
        let ctx = TestContext::new().await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;

        let first = ctx
            .orders
            .commit(helpers::new_order(account, Some("order_Nx1")))
            .await?;

        let second = ctx
            .orders
            .commit(helpers::new_order(account, Some("order_Nx1")))
            .await;

        assert!(
            matches!(second, Err(OrdersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {second:?}"
        );

        let found = ctx.orders.find_by_intent("order_Nx1").await?;

        assert_eq!(found.map(|order| order.uuid), Some(first.uuid));
        assert_eq!(ctx.orders.list_for_buyer(account).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn cancelling_releases_the_shipment_first() -> TestResult {
        let mut sequence = Sequence::new();
        let mut dispatcher = MockShipmentDispatcher::new();

        dispatcher
            .expect_create_shipment()
            .once()
            .in_sequence(&mut sequence)
            .return_once(|_| Ok(booked("AWB100")));
        dispatcher
            .expect_cancel_shipment()
            .once()
            .in_sequence(&mut sequence)
            .withf(|awb| awb == "AWB100")
            .return_once(|_| Ok(()));

        let ctx = TestContext::with_dispatcher(dispatcher).await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;
        let order = ctx.orders.commit(helpers::new_order(account, None)).await?;

        let shipped = ctx.orders.create_shipment(order.uuid).await?;

        assert_eq!(
            shipped.shipment.as_ref().map(|s| s.awb_code.as_str()),
            Some("AWB100")
        );

        let cancelled = ctx
            .orders
            .cancel(order.uuid, "Changed my mind", Actor::Customer)
            .await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.shipment, None);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Changed my mind"));
        assert_eq!(cancelled.cancelled_by, Some(Actor::Customer));
        assert_eq!(
            cancelled.history.last().map(|entry| entry.status),
            Some(OrderStatus::Cancelled)
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_shipment_release_still_cancels_the_order() -> TestResult {
        let mut dispatcher = MockShipmentDispatcher::new();

        dispatcher
            .expect_create_shipment()
            .once()
            .return_once(|_| Ok(booked("AWB200")));
        dispatcher
            .expect_cancel_shipment()
            .once()
            .return_once(|_| Err(ShipmentError::UnexpectedResponse("timeout".to_string())));

        let ctx = TestContext::with_dispatcher(dispatcher).await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;
        let order = ctx.orders.commit(helpers::new_order(account, None)).await?;

        ctx.orders.create_shipment(order.uuid).await?;

        let cancelled = ctx
            .orders
            .cancel(order.uuid, "Out of stock", Actor::Admin)
            .await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            cancelled.shipment.map(|s| s.awb_code),
            Some("AWB200".to_string())
        );

        let again = ctx.orders.cancel(order.uuid, "twice", Actor::Admin).await;

        assert!(
            matches!(again, Err(OrdersServiceError::NotCancellable(OrderStatus::Cancelled))),
            "expected NotCancellable, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refunds_mark_the_payment_refunded() -> TestResult {
        let ctx = TestContext::new().await?;
        let account = helpers::create_account(&ctx, "asha@example.com").await?;
        let order = ctx.orders.commit(helpers::new_order(account, None)).await?;

        let refunded = ctx
            .orders
            .update_status(order.uuid, OrderStatus::Refunded, "Refund issued", Actor::Admin)
            .await?;

        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);

        let reopened = ctx
            .orders
            .update_status(order.uuid, OrderStatus::Processing, "", Actor::Admin)
            .await;

        assert!(
            matches!(reopened, Err(OrdersServiceError::InvalidTransition { .. })),
            "expected InvalidTransition, got {reopened:?}"
        );

        Ok(())
    }
}
