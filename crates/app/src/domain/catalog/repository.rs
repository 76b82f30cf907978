//! Catalog Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_amount, try_get_count, try_get_parsed},
    domain::catalog::models::{Collection, CollectionUuid, Product, ProductUuid},
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_COLLECTION_SQL: &str = include_str!("sql/get_collection.sql");
const LIST_COLLECTION_MEMBERS_SQL: &str = include_str!("sql/list_collection_members.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_collection(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection: CollectionUuid,
    ) -> Result<Collection, sqlx::Error> {
        query_as::<Postgres, Collection>(GET_COLLECTION_SQL)
            .bind(collection.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_collection_members(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection: CollectionUuid,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(LIST_COLLECTION_MEMBERS_SQL)
            .bind(collection.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let level = row
            .try_get::<Option<i32>, _>("level")?
            .map(u32::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "level".to_string(),
                source: Box::new(e),
            })?;

        let stock = match row.try_get::<Option<i32>, _>("stock")? {
            Some(_) => Some(try_get_count(row, "stock")?),
            None => None,
        };

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            kind: try_get_parsed(row, "kind")?,
            level,
            price: try_get_amount(row, "price")?,
            image: row.try_get("image")?,
            stock,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Collection {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let base_price = match row.try_get::<Option<i64>, _>("base_price")? {
            Some(_) => Some(try_get_amount(row, "base_price")?),
            None => None,
        };

        Ok(Self {
            uuid: CollectionUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            kind: try_get_parsed(row, "kind")?,
            base_price,
            image: row.try_get("image")?,
            members: Vec::new(),
        })
    }
}
