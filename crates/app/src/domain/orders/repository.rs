//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
    types::Json,
};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, count_to_db, try_get_amount, try_get_count, try_get_parsed},
    domain::{
        accounts::models::AccountUuid,
        carts::models::{CustomDesign, Variant},
        catalog::models::CollectionUuid,
        coupons::models::AppliedCoupon,
        orders::models::{
            Actor, LeaderboardLine, NewOrder, Order, OrderLine, OrderStatus, OrderUuid,
            PaymentStatus, ShipmentRecord, ShippingAddress, SourceCollection, StatusEntry,
            Tracking,
        },
    },
};

const LAST_ORDER_SEQUENCE_SQL: &str = include_str!("sql/last_order_sequence.sql");
const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_LINE_SQL: &str = include_str!("sql/insert_order_line.sql");
const INSERT_STATUS_ENTRY_SQL: &str = include_str!("sql/insert_status_entry.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const FIND_ORDER_BY_INTENT_SQL: &str = include_str!("sql/find_order_by_intent.sql");
const LIST_ORDERS_FOR_ACCOUNT_SQL: &str = include_str!("sql/list_orders_for_account.sql");
const LIST_ORDERS_FOR_EMAIL_SQL: &str = include_str!("sql/list_orders_for_email.sql");
const LIST_ORDER_LINES_SQL: &str = include_str!("sql/list_order_lines.sql");
const LIST_STATUS_HISTORY_SQL: &str = include_str!("sql/list_status_history.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const UPDATE_TRACKING_SQL: &str = include_str!("sql/update_tracking.sql");
const SET_SHIPMENT_SQL: &str = include_str!("sql/set_shipment.sql");
const CLEAR_SHIPMENT_SQL: &str = include_str!("sql/clear_shipment.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");
const LIST_LEADERBOARD_LINES_SQL: &str = include_str!("sql/list_leaderboard_lines.sql");

/// Column changes written alongside a status change.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusChange<'a> {
    pub payment_status: Option<PaymentStatus>,
    pub cancellation_reason: Option<&'a str>,
    pub cancelled_by: Option<Actor>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Highest sequence already used under `ORD-{year}-`.
    pub(crate) async fn last_sequence(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        year_prefix: &str,
    ) -> Result<u64, sqlx::Error> {
        let last: i64 = query_scalar(LAST_ORDER_SEQUENCE_SQL)
            .bind(format!("{year_prefix}%"))
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(last).map_err(|e| sqlx::Error::ColumnDecode {
            index: "order_number".to_string(),
            source: Box::new(e),
        })
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
        order: &NewOrder,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order_number)
            .bind(order.account.into_uuid())
            .bind(amount_to_db(order.subtotal, "subtotal")?)
            .bind(amount_to_db(order.shipping_cost, "shipping_cost")?)
            .bind(amount_to_db(order.discount_total(), "discount_total")?)
            .bind(amount_to_db(order.total_amount(), "total_amount")?)
            .bind(Json(&order.applied_coupons))
            .bind(order.status.as_str())
            .bind(order.payment_method.as_str())
            .bind(order.payment_status.as_str())
            .bind(order.gateway_intent_id.as_deref())
            .bind(order.gateway_payment_id.as_deref())
            .bind(Json(&order.shipping_address))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn insert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: usize,
        line: &OrderLine,
    ) -> Result<(), sqlx::Error> {
        let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
            index: "position".to_string(),
            source: Box::new(e),
        })?;

        query(INSERT_ORDER_LINE_SQL)
            .bind(Uuid::now_v7())
            .bind(order.into_uuid())
            .bind(position)
            .bind(line.item_type.as_str())
            .bind(line.reference)
            .bind(line.collection.as_ref().map(|c| c.uuid.into_uuid()))
            .bind(line.collection.as_ref().map(|c| c.name.as_str()))
            .bind(line.collection.as_ref().and_then(|c| c.image.as_deref()))
            .bind(&line.product_name)
            .bind(line.image.as_deref())
            .bind(amount_to_db(line.unit_price, "unit_price")?)
            .bind(count_to_db(line.quantity, "quantity")?)
            .bind(&line.phone_model)
            .bind(line.variant.brand.as_deref())
            .bind(line.variant.model.as_deref())
            .bind(line.custom_design.as_ref().map(Json))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn insert_status_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        note: &str,
        actor: Actor,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_STATUS_ENTRY_SQL)
            .bind(Uuid::now_v7())
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(note)
            .bind(actor.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        intent_id: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(FIND_ORDER_BY_INTENT_SQL)
            .bind(intent_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_ORDERS_FOR_ACCOUNT_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_ORDERS_FOR_EMAIL_SQL)
            .bind(email)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        query_as::<Postgres, OrderLine>(LIST_ORDER_LINES_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<StatusEntry>, sqlx::Error> {
        query_as::<Postgres, StatusEntry>(LIST_STATUS_HISTORY_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        change: StatusChange<'_>,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(change.payment_status.map(PaymentStatus::as_str))
            .bind(change.cancellation_reason)
            .bind(change.cancelled_by.map(Actor::as_str))
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn update_tracking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        tracking: &Tracking,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(UPDATE_TRACKING_SQL)
            .bind(order.into_uuid())
            .bind(tracking.tracking_number.as_deref())
            .bind(tracking.tracking_link.as_deref())
            .bind(tracking.courier_name.as_deref())
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn set_shipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        shipment: &ShipmentRecord,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(SET_SHIPMENT_SQL)
            .bind(order.into_uuid())
            .bind(&shipment.awb_code)
            .bind(shipment.shipment_id.as_deref())
            .bind(shipment.courier_name.as_deref())
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn clear_shipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(CLEAR_SHIPMENT_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn list_leaderboard_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        statuses: &[OrderStatus],
    ) -> Result<Vec<LeaderboardLine>, sqlx::Error> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();

        query_as::<Postgres, LeaderboardLine>(LIST_LEADERBOARD_LINES_SQL)
            .bind(statuses)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let awb_code: Option<String> = row.try_get("awb_code")?;
        let courier_name: Option<String> = row.try_get("courier_name")?;
        let cancelled_by: Option<String> = row.try_get("cancelled_by")?;

        let shipment = match awb_code {
            Some(awb_code) => Some(ShipmentRecord {
                awb_code,
                shipment_id: row.try_get("shipment_id")?,
                courier_name: courier_name.clone(),
            }),
            None => None,
        };

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            account: AccountUuid::from_uuid(row.try_get("account_uuid")?),
            lines: Vec::new(),
            subtotal: try_get_amount(row, "subtotal")?,
            shipping_cost: try_get_amount(row, "shipping_cost")?,
            discount_total: try_get_amount(row, "discount_total")?,
            total_amount: try_get_amount(row, "total_amount")?,
            applied_coupons: row
                .try_get::<Json<Vec<AppliedCoupon>>, _>("applied_coupons")?
                .0,
            status: try_get_parsed(row, "status")?,
            payment_method: try_get_parsed(row, "payment_method")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            gateway_intent_id: row.try_get("gateway_intent_id")?,
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            shipping_address: row
                .try_get::<Json<ShippingAddress>, _>("shipping_address")?
                .0,
            shipment,
            tracking: Tracking {
                tracking_number: row.try_get("tracking_number")?,
                tracking_link: row.try_get("tracking_link")?,
                courier_name,
            },
            cancellation_reason: row.try_get("cancellation_reason")?,
            cancelled_by: cancelled_by
                .map(|actor| {
                    actor.parse::<Actor>().map_err(|e| sqlx::Error::ColumnDecode {
                        index: "cancelled_by".to_string(),
                        source: Box::new(e),
                    })
                })
                .transpose()?,
            history: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let collection_uuid: Option<Uuid> = row.try_get("collection_uuid")?;
        let collection_name: Option<String> = row.try_get("collection_name")?;

        let collection = match (collection_uuid, collection_name) {
            (Some(uuid), Some(name)) => Some(SourceCollection {
                uuid: CollectionUuid::from_uuid(uuid),
                name,
                image: row.try_get("collection_image")?,
            }),
            _ => None,
        };

        Ok(Self {
            item_type: try_get_parsed(row, "item_type")?,
            reference: row.try_get("reference_uuid")?,
            collection,
            product_name: row.try_get("product_name")?,
            image: row.try_get("image")?,
            unit_price: try_get_amount(row, "unit_price")?,
            quantity: try_get_count(row, "quantity")?,
            phone_model: row.try_get("phone_model")?,
            variant: Variant {
                brand: row.try_get("selected_brand")?,
                model: row.try_get("selected_model")?,
            },
            custom_design: row
                .try_get::<Option<Json<CustomDesign>>, _>("custom_design")?
                .map(|design| design.0),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StatusEntry {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            status: try_get_parsed(row, "status")?,
            note: row.try_get("note")?,
            actor: try_get_parsed(row, "actor")?,
            recorded_at: row.try_get::<SqlxTimestamp, _>("recorded_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for LeaderboardLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            account: AccountUuid::from_uuid(row.try_get("account_uuid")?),
            username: row.try_get("username")?,
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item_type: try_get_parsed(row, "item_type")?,
            from_collection: row.try_get("from_collection")?,
        })
    }
}
