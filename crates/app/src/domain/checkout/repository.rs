//! Checkout Intents Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::{amount_to_db, try_get_amount, try_get_parsed},
    domain::{
        carts::models::CartLine,
        checkout::models::{CheckoutIntent, CheckoutIntentStatus, NewCheckoutIntent, Quote},
        coupons::models::AppliedCoupon,
    },
};

const INSERT_INTENT_SQL: &str = include_str!("sql/insert_intent.sql");
const GET_INTENT_SQL: &str = include_str!("sql/get_intent.sql");
const UPDATE_INTENT_STATUS_SQL: &str = include_str!("sql/update_intent_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCheckoutIntentsRepository;

impl PgCheckoutIntentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        intent: &NewCheckoutIntent,
    ) -> Result<CheckoutIntent, sqlx::Error> {
        let quote = &intent.quote;

        query_as::<Postgres, CheckoutIntent>(INSERT_INTENT_SQL)
            .bind(&intent.gateway_intent_id)
            .bind(&intent.cart_key)
            .bind(CheckoutIntentStatus::AwaitingPayment.as_str())
            .bind(Json(&quote.lines))
            .bind(Json(&quote.applied_coupons))
            .bind(amount_to_db(quote.subtotal, "subtotal")?)
            .bind(amount_to_db(quote.shipping_cost, "shipping_cost")?)
            .bind(amount_to_db(quote.discount_total, "discount_total")?)
            .bind(amount_to_db(quote.total_amount, "total_amount")?)
            .bind(&intent.currency)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gateway_intent_id: &str,
    ) -> Result<CheckoutIntent, sqlx::Error> {
        query_as::<Postgres, CheckoutIntent>(GET_INTENT_SQL)
            .bind(gateway_intent_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gateway_intent_id: &str,
        status: CheckoutIntentStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = query(UPDATE_INTENT_STATUS_SQL)
            .bind(gateway_intent_id)
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for CheckoutIntent {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let created_at: SqlxTimestamp = row.try_get("created_at")?;

        Ok(Self {
            gateway_intent_id: row.try_get("gateway_intent_id")?,
            cart_key: row.try_get("cart_key")?,
            status: try_get_parsed(row, "status")?,
            quote: Quote {
                lines: row.try_get::<Json<Vec<CartLine>>, _>("lines")?.0,
                subtotal: try_get_amount(row, "subtotal")?,
                shipping_cost: try_get_amount(row, "shipping_cost")?,
                applied_coupons: row
                    .try_get::<Json<Vec<AppliedCoupon>>, _>("applied_coupons")?
                    .0,
                discount_total: try_get_amount(row, "discount_total")?,
                total_amount: try_get_amount(row, "total_amount")?,
            },
            currency: row.try_get("currency")?,
            created_at: created_at.to_jiff(),
        })
    }
}
