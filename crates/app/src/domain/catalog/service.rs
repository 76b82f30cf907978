//! Catalog service.
//!
//! Read-only access to products and collections. Catalog maintenance happens
//! elsewhere; checkout only ever reads.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError,
        models::{Collection, CollectionUuid, Product, ProductUuid},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn get_product(&self, product: ProductUuid) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_collection(
        &self,
        collection: CollectionUuid,
    ) -> Result<Collection, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let mut found = self.repository.get_collection(&mut tx, collection).await?;

        found.members = self
            .repository
            .list_collection_members(&mut tx, collection)
            .await?;

        tx.commit().await?;

        Ok(found)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, CatalogServiceError>;

    /// Retrieve a collection with its members in collection order.
    async fn get_collection(
        &self,
        collection: CollectionUuid,
    ) -> Result<Collection, CatalogServiceError>;
}
