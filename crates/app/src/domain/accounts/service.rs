//! Accounts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        accounts::{
            credentials::{Secret, issue_session},
            errors::AccountsServiceError,
            models::{Account, AccountUuid, GamingCollectionGrant, NewAccount, score_from_levels},
            repository::PgAccountsRepository,
        },
        catalog::models::{CollectionUuid, ProductUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgAccountsService {
    db: Db,
    repository: PgAccountsRepository,
}

impl PgAccountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAccountsRepository::new(),
        }
    }

    async fn unlock_products(
        &self,
        account: AccountUuid,
        products: &[ProductUuid],
    ) -> Result<u64, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let added = self
            .repository
            .unlock_products(&mut tx, account, products)
            .await?;

        tx.commit().await?;

        Ok(added)
    }

    async fn unlock_collections(
        &self,
        account: AccountUuid,
        collections: &[CollectionUuid],
    ) -> Result<u64, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let added = self
            .repository
            .unlock_collections(&mut tx, account, collections)
            .await?;

        tx.commit().await?;

        Ok(added)
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    async fn find_account(
        &self,
        account: AccountUuid,
    ) -> Result<Option<Account>, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let found = self.repository.find_account(&mut tx, account).await?;

        tx.commit().await?;

        Ok(found)
    }

    async fn find_by_contact(
        &self,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<Option<Account>, AccountsServiceError> {
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let mut tx = self.db.begin().await?;

        let found = self
            .repository
            .find_by_contact(&mut tx, email.as_deref(), phone.as_deref())
            .await?;

        tx.commit().await?;

        Ok(found)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_account(&mut tx, &account).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn has_session(&self, account: AccountUuid) -> Result<bool, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let exists = self.repository.has_session(&mut tx, account).await?;

        tx.commit().await?;

        Ok(exists)
    }

    async fn issue_session(&self, account: AccountUuid) -> Result<String, AccountsServiceError> {
        let secret = Secret::generate();
        let issued = issue_session(Uuid::now_v7(), &secret);

        let mut tx = self.db.begin().await?;

        self.repository
            .create_session(&mut tx, issued.session_uuid, account, &issued.token_hash)
            .await?;

        tx.commit().await?;

        Ok(issued.token)
    }

    async fn unlocked_products(
        &self,
        account: AccountUuid,
    ) -> Result<Vec<ProductUuid>, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_unlocked_products(&mut tx, account).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn unlock(
        &self,
        account: AccountUuid,
        products: Vec<ProductUuid>,
        collections: Vec<CollectionUuid>,
    ) -> Result<(), AccountsServiceError> {
        let products_added = if products.is_empty() {
            Ok(0)
        } else {
            self.unlock_products(account, &products).await
        };

        let collections_added = if collections.is_empty() {
            Ok(0)
        } else {
            self.unlock_collections(account, &collections).await
        };

        let (products_added, collections_added) = (products_added?, collections_added?);

        debug!(%account, products_added, collections_added, "unlocked content");

        Ok(())
    }

    async fn grant_gaming_cards(
        &self,
        account: AccountUuid,
        grant: GamingCollectionGrant,
    ) -> Result<u32, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository
            .upsert_gaming_collection(&mut tx, account, &grant)
            .await?;

        let mut added = 0_u32;

        for card in &grant.cards {
            if self
                .repository
                .add_gaming_card(&mut tx, account, grant.collection, card)
                .await?
            {
                added = added.saturating_add(1);
            }
        }

        tx.commit().await?;

        Ok(added)
    }

    async fn recalculate_score(&self, account: AccountUuid) -> Result<u64, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let levels = self.repository.list_owned_card_levels(&mut tx, account).await?;
        let score = score_from_levels(&levels);

        if self.repository.set_score(&mut tx, account, score).await? == 0 {
            return Err(AccountsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(score)
    }

    async fn list_account_ids(&self) -> Result<Vec<AccountUuid>, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let accounts = self.repository.list_account_uuids(&mut tx).await?;

        tx.commit().await?;

        Ok(accounts)
    }
}

#[automock]
#[async_trait]
pub trait AccountsService: Send + Sync {
    /// Retrieve an account, `None` when it does not exist.
    async fn find_account(
        &self,
        account: AccountUuid,
    ) -> Result<Option<Account>, AccountsServiceError>;

    /// Look an account up by email or phone.
    async fn find_by_contact(
        &self,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<Option<Account>, AccountsServiceError>;

    /// Persist a new account.
    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountsServiceError>;

    /// Whether the account has ever been issued a session.
    async fn has_session(&self, account: AccountUuid) -> Result<bool, AccountsServiceError>;

    /// Mint a session and return its raw token.
    async fn issue_session(&self, account: AccountUuid) -> Result<String, AccountsServiceError>;

    /// Product ids the account already owns.
    async fn unlocked_products(
        &self,
        account: AccountUuid,
    ) -> Result<Vec<ProductUuid>, AccountsServiceError>;

    /// Add products and collections to the account's unlocked sets.
    ///
    /// Products and collections are stored independently, and ids that are
    /// no longer in the catalog are skipped.
    async fn unlock(
        &self,
        account: AccountUuid,
        products: Vec<ProductUuid>,
        collections: Vec<CollectionUuid>,
    ) -> Result<(), AccountsServiceError>;

    /// Record gaming cards for one collection, returning how many were new.
    async fn grant_gaming_cards(
        &self,
        account: AccountUuid,
        grant: GamingCollectionGrant,
    ) -> Result<u32, AccountsServiceError>;

    /// Recompute the score from every owned card and store it.
    async fn recalculate_score(&self, account: AccountUuid) -> Result<u64, AccountsServiceError>;

    /// Every account id, oldest first.
    async fn list_account_ids(&self) -> Result<Vec<AccountUuid>, AccountsServiceError>;
}
