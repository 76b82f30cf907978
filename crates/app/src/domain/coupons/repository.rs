//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{amount_to_db, count_to_db, try_get_amount, try_get_count},
    domain::coupons::models::{Coupon, CouponUuid, NewCoupon},
};

const GET_COUPON_BY_CODE_SQL: &str = include_str!("sql/get_coupon_by_code.sql");
const LOCK_COUPON_BY_CODE_SQL: &str = include_str!("sql/lock_coupon_by_code.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const RECORD_REDEMPTION_SQL: &str = include_str!("sql/record_redemption.sql");
const INCREMENT_USED_COUNT_SQL: &str = include_str!("sql/increment_used_count.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        query_as::<Postgres, Coupon>(GET_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn lock_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Coupon, sqlx::Error> {
        query_as::<Postgres, Coupon>(LOCK_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CouponUuid,
        coupon: &NewCoupon,
    ) -> Result<Coupon, sqlx::Error> {
        query_as::<Postgres, Coupon>(CREATE_COUPON_SQL)
            .bind(uuid.into_uuid())
            .bind(&coupon.code)
            .bind(i32::from(coupon.discount_percentage))
            .bind(amount_to_db(coupon.minimum_amount, "minimum_amount")?)
            .bind(count_to_db(coupon.max_usage, "max_usage")?)
            .bind(SqlxTimestamp::from(coupon.expires_at))
            .bind(coupon.description.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    /// Returns `false` when this reference already redeemed the coupon.
    pub(crate) async fn record_redemption(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        reference: &str,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RECORD_REDEMPTION_SQL)
            .bind(coupon.into_uuid())
            .bind(reference)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Returns `false` when the usage cap has already been reached.
    pub(crate) async fn increment_used_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INCREMENT_USED_COUNT_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for Coupon {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let percentage: i32 = row.try_get("discount_percentage")?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount_percentage: u8::try_from(percentage).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "discount_percentage".to_string(),
                    source: Box::new(e),
                }
            })?,
            minimum_amount: try_get_amount(row, "minimum_amount")?,
            max_usage: try_get_count(row, "max_usage")?,
            used_count: try_get_count(row, "used_count")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            is_active: row.try_get("is_active")?,
            description: row.try_get("description")?,
        })
    }
}
