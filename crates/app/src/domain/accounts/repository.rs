//! Accounts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, try_get_amount},
    domain::{
        accounts::models::{Account, AccountUuid, GamingCard, GamingCollectionGrant, NewAccount},
        catalog::models::{CollectionUuid, ProductUuid},
    },
};

const GET_ACCOUNT_SQL: &str = include_str!("sql/get_account.sql");
const FIND_ACCOUNT_BY_CONTACT_SQL: &str = include_str!("sql/find_account_by_contact.sql");
const CREATE_ACCOUNT_SQL: &str = include_str!("sql/create_account.sql");
const LIST_ACCOUNT_UUIDS_SQL: &str = include_str!("sql/list_account_uuids.sql");
const HAS_SESSION_SQL: &str = include_str!("sql/has_session.sql");
const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const LIST_UNLOCKED_PRODUCTS_SQL: &str = include_str!("sql/list_unlocked_products.sql");
const UNLOCK_PRODUCTS_SQL: &str = include_str!("sql/unlock_products.sql");
const UNLOCK_COLLECTIONS_SQL: &str = include_str!("sql/unlock_collections.sql");
const UPSERT_GAMING_COLLECTION_SQL: &str = include_str!("sql/upsert_gaming_collection.sql");
const ADD_GAMING_CARD_SQL: &str = include_str!("sql/add_gaming_card.sql");
const LIST_OWNED_CARD_LEVELS_SQL: &str = include_str!("sql/list_owned_card_levels.sql");
const SET_SCORE_SQL: &str = include_str!("sql/set_score.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAccountsRepository;

impl PgAccountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Option<Account>, sqlx::Error> {
        query_as::<Postgres, Account>(GET_ACCOUNT_SQL)
            .bind(account.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_contact(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Account>, sqlx::Error> {
        query_as::<Postgres, Account>(FIND_ACCOUNT_BY_CONTACT_SQL)
            .bind(email)
            .bind(phone)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: &NewAccount,
    ) -> Result<Account, sqlx::Error> {
        query_as::<Postgres, Account>(CREATE_ACCOUNT_SQL)
            .bind(account.uuid.into_uuid())
            .bind(&account.username)
            .bind(account.email.as_deref())
            .bind(account.phone.as_deref())
            .bind(&account.credential_hash)
            .bind(account.email_verified)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_account_uuids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<AccountUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = query_scalar(LIST_ACCOUNT_UUIDS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(uuids.into_iter().map(AccountUuid::from_uuid).collect())
    }

    pub(crate) async fn has_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(HAS_SESSION_SQL)
            .bind(account.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: Uuid,
        account: AccountUuid,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_SESSION_SQL)
            .bind(session)
            .bind(account.into_uuid())
            .bind(token_hash)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_unlocked_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Vec<ProductUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = query_scalar(LIST_UNLOCKED_PRODUCTS_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(uuids.into_iter().map(ProductUuid::from_uuid).collect())
    }

    pub(crate) async fn unlock_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        products: &[ProductUuid],
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|p| p.into_uuid()).collect();

        Ok(query(UNLOCK_PRODUCTS_SQL)
            .bind(account.into_uuid())
            .bind(uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn unlock_collections(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        collections: &[CollectionUuid],
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = collections.iter().map(|c| c.into_uuid()).collect();

        Ok(query(UNLOCK_COLLECTIONS_SQL)
            .bind(account.into_uuid())
            .bind(uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }

    pub(crate) async fn upsert_gaming_collection(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        grant: &GamingCollectionGrant,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_GAMING_COLLECTION_SQL)
            .bind(account.into_uuid())
            .bind(grant.collection.into_uuid())
            .bind(&grant.collection_name)
            .bind(grant.collection_image.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Returns `false` when the card was already owned.
    pub(crate) async fn add_gaming_card(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        collection: CollectionUuid,
        card: &GamingCard,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(ADD_GAMING_CARD_SQL)
            .bind(account.into_uuid())
            .bind(collection.into_uuid())
            .bind(card.product.into_uuid())
            .bind(&card.name)
            .bind(card.image.as_deref())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn list_owned_card_levels(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Vec<u32>, sqlx::Error> {
        let levels: Vec<i32> = query_scalar(LIST_OWNED_CARD_LEVELS_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        levels
            .into_iter()
            .map(|level| {
                u32::try_from(level).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "level".to_string(),
                    source: Box::new(e),
                })
            })
            .collect()
    }

    pub(crate) async fn set_score(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        score: u64,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(SET_SCORE_SQL)
            .bind(account.into_uuid())
            .bind(amount_to_db(score, "score")?)
            .execute(&mut **tx)
            .await?
            .rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AccountUuid::from_uuid(row.try_get("uuid")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            email_verified: row.try_get("email_verified")?,
            score: try_get_amount(row, "score")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
