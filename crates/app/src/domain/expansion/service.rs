//! Collection expansion service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::domain::{
    accounts::{AccountsService, models::AccountUuid},
    catalog::{
        CatalogService,
        models::{CollectionUuid, ProductUuid},
    },
    expansion::{
        errors::ExpansionError,
        selection::{select_unique, split_price},
    },
};

/// One concrete card granted from a collection purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedCard {
    pub product: ProductUuid,
    pub name: String,
    pub image: Option<String>,
    pub level: u32,
    pub unit_price: u64,
}

/// A collection line resolved into cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub collection: CollectionUuid,
    pub collection_name: String,
    pub collection_image: Option<String>,
    pub cards: Vec<ExpandedCard>,
}

impl Expansion {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cards
            .iter()
            .fold(0_u64, |sum, card| sum.saturating_add(card.unit_price))
    }
}

pub struct CollectionExpansionResolver {
    catalog: Arc<dyn CatalogService>,
    accounts: Arc<dyn AccountsService>,
}

impl fmt::Debug for CollectionExpansionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionExpansionResolver")
            .finish_non_exhaustive()
    }
}

impl CollectionExpansionResolver {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogService>, accounts: Arc<dyn AccountsService>) -> Self {
        Self { catalog, accounts }
    }
}

#[async_trait]
impl ExpansionService for CollectionExpansionResolver {
    async fn expand(
        &self,
        collection: CollectionUuid,
        quantity: u32,
        line_total: u64,
        account: AccountUuid,
    ) -> Result<Expansion, ExpansionError> {
        let collection = self.catalog.get_collection(collection).await?;

        if collection.eligible_members().is_empty() {
            return Err(ExpansionError::NoEligibleMembers);
        }

        let owned: FxHashSet<ProductUuid> = self
            .accounts
            .unlocked_products(account)
            .await?
            .into_iter()
            .collect();

        let cards = {
            let pool = collection.eligible_members();
            let selected = select_unique(&pool, &owned, quantity, &mut rand::thread_rng());
            let shares = split_price(line_total, selected.len());

            selected
                .into_iter()
                .zip(shares)
                .map(|(product, unit_price)| ExpandedCard {
                    product: product.uuid,
                    name: product.name.clone(),
                    image: product.image.clone(),
                    level: product.level.unwrap_or_default(),
                    unit_price,
                })
                .collect::<Vec<_>>()
        };

        debug!(
            collection = %collection.uuid,
            quantity,
            granted = cards.len(),
            owned = owned.len(),
            "expanded collection line"
        );

        Ok(Expansion {
            collection: collection.uuid,
            collection_name: collection.name,
            collection_image: collection.image,
            cards,
        })
    }
}

#[automock]
#[async_trait]
pub trait ExpansionService: Send + Sync {
    /// Resolve `quantity` units of a collection into concrete cards for an
    /// account, splitting `line_total` across them.
    async fn expand(
        &self,
        collection: CollectionUuid,
        quantity: u32,
        line_total: u64,
        account: AccountUuid,
    ) -> Result<Expansion, ExpansionError>;
}
