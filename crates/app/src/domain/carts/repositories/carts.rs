//! Carts Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, try_get_amount},
    domain::{carts::models::CartUuid, coupons::models::AppliedCoupon},
};

const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const LIST_CART_COUPONS_SQL: &str = include_str!("../sql/list_cart_coupons.sql");
const INSERT_CART_COUPON_SQL: &str = include_str!("../sql/insert_cart_coupon.sql");
const DELETE_CART_COUPON_SQL: &str = include_str!("../sql/delete_cart_coupon.sql");
const CLEAR_CART_COUPONS_SQL: &str = include_str!("../sql/clear_cart_coupons.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<Option<CartUuid>, sqlx::Error> {
        let uuid: Option<Uuid> = query_scalar(FIND_CART_SQL)
            .bind(key)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(uuid.map(CartUuid::from_uuid))
    }

    /// Find the cart for `key`, creating it when absent.
    pub(crate) async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<CartUuid, sqlx::Error> {
        let uuid: Uuid = query_scalar(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(key)
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartUuid::from_uuid(uuid))
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<AppliedCoupon>, sqlx::Error> {
        let rows: Vec<CartCouponRow> = query_as(LIST_CART_COUPONS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub(crate) async fn insert_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        coupon: &AppliedCoupon,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CART_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(&coupon.code)
            .bind(i32::from(coupon.discount_percentage))
            .bind(amount_to_db(coupon.discount_amount, "discount_amount")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        code: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<(), sqlx::Error> {
        query(CLEAR_CART_COUPONS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

struct CartCouponRow(AppliedCoupon);

impl<'r> FromRow<'r, PgRow> for CartCouponRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let percentage: i32 = row.try_get("discount_percentage")?;

        Ok(Self(AppliedCoupon {
            code: row.try_get("code")?,
            discount_percentage: u8::try_from(percentage).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "discount_percentage".to_string(),
                    source: Box::new(e),
                }
            })?,
            discount_amount: try_get_amount(row, "discount_amount")?,
        }))
    }
}
