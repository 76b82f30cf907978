//! Cart Lines Repository

use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json,
};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, count_to_db, try_get_amount, try_get_count, try_get_parsed},
    domain::carts::models::{
        CartLine, CartLineKind, CartLineUuid, CartUuid, CustomDesign, LineItem, Variant,
    },
};

const LIST_CART_LINES_SQL: &str = include_str!("../sql/list_cart_lines.sql");
const INSERT_CART_LINE_SQL: &str = include_str!("../sql/insert_cart_line.sql");
const UPDATE_CART_LINE_QUANTITY_SQL: &str = include_str!("../sql/update_cart_line_quantity.sql");
const DELETE_CART_LINE_SQL: &str = include_str!("../sql/delete_cart_line.sql");
const CLEAR_CART_LINES_SQL: &str = include_str!("../sql/clear_cart_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(LIST_CART_LINES_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn insert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: &CartLine,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CART_LINE_SQL)
            .bind(line.uuid.into_uuid())
            .bind(cart.into_uuid())
            .bind(line.item.kind().as_str())
            .bind(line.item.reference())
            .bind(&line.name)
            .bind(line.image.as_deref())
            .bind(count_to_db(line.quantity, "quantity")?)
            .bind(amount_to_db(line.unit_price, "unit_price")?)
            .bind(line.variant.brand.as_deref())
            .bind(line.variant.model.as_deref())
            .bind(line.item.design().map(Json))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_LINE_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(line.into_uuid())
            .bind(count_to_db(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_LINE_SQL)
            .bind(cart.into_uuid())
            .bind(line.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<(), sqlx::Error> {
        query(CLEAR_CART_LINES_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: CartLineKind = try_get_parsed(row, "line_type")?;
        let reference: Uuid = row.try_get("reference_uuid")?;
        let design = row
            .try_get::<Option<Json<CustomDesign>>, _>("custom_design")?
            .map(|Json(design)| design);

        let item = LineItem::from_parts(kind, reference, design).ok_or_else(|| {
            sqlx::Error::ColumnDecode {
                index: "custom_design".to_string(),
                source: "custom design line without a design payload".into(),
            }
        })?;

        Ok(Self {
            uuid: CartLineUuid::from_uuid(row.try_get("uuid")?),
            item,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            quantity: try_get_count(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            variant: Variant {
                brand: row.try_get("selected_brand")?,
                model: row.try_get("selected_model")?,
            },
        })
    }
}
