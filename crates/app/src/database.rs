//! Database connection management

use std::{error::Error as StdError, str::FromStr};

use async_trait::async_trait;
use mockall::automock;
use sqlx::{
    PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow, query,
};

/// Serialises order number allocation across concurrent commits.
const ORDER_NUMBER_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext('orders.order_number'))";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a transaction holding the order numbering lock until commit.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or taking the lock fails.
    pub async fn begin_order_numbering(
        &self,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(ORDER_NUMBER_LOCK_SQL).execute(&mut *tx).await?;

        Ok(tx)
    }
}

/// Reachability of the backing store.
#[automock]
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    /// Round-trip a trivial query.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl DatabaseHealth for Db {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative minor-unit amount stored as `BIGINT`.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a non-negative count stored as `INTEGER`.
pub(crate) fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i32: i32 = row.try_get(col)?;

    u32::try_from(count_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a `TEXT` column holding an enum's storage value.
pub(crate) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let raw: String = row.try_get(col)?;

    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a minor-unit amount into its `BIGINT` bind value.
pub(crate) fn amount_to_db(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a count into its `INTEGER` bind value.
pub(crate) fn count_to_db(count: u32, col: &str) -> Result<i32, sqlx::Error> {
    i32::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
