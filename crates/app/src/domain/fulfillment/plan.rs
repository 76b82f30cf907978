//! What an order unlocks.

use rustc_hash::FxHashSet;

use crate::domain::{
    accounts::models::{GamingCard, GamingCollectionGrant},
    catalog::models::{CollectionUuid, ProductUuid},
    orders::models::{Order, OrderItemType},
};

/// Content an order unlocks for its buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockPlan {
    pub products: Vec<ProductUuid>,
    pub collections: Vec<CollectionUuid>,
    pub grants: Vec<GamingCollectionGrant>,
}

impl UnlockPlan {
    /// Purchased items and expanded cards unlock their product; every source
    /// collection unlocks and becomes a card grant group, in order line order.
    #[must_use]
    pub fn for_order(order: &Order) -> Self {
        let mut plan = Self::default();
        let mut seen_products = FxHashSet::default();
        let mut seen_collections = FxHashSet::default();

        for line in &order.lines {
            let product = ProductUuid::from_uuid(line.reference);
            let unlocks_product = matches!(
                line.item_type,
                OrderItemType::Item | OrderItemType::Product
            );

            if unlocks_product && seen_products.insert(product) {
                plan.products.push(product);
            }

            let Some(source) = &line.collection else {
                continue;
            };

            if seen_collections.insert(source.uuid) {
                plan.collections.push(source.uuid);
                plan.grants.push(GamingCollectionGrant {
                    collection: source.uuid,
                    collection_name: source.name.clone(),
                    collection_image: source.image.clone(),
                    cards: Vec::new(),
                });
            }

            if line.item_type != OrderItemType::Product {
                continue;
            }

            if let Some(grant) = plan
                .grants
                .iter_mut()
                .find(|grant| grant.collection == source.uuid)
                && !grant.cards.iter().any(|card| card.product == product)
            {
                grant.cards.push(GamingCard {
                    product,
                    name: line.product_name.clone(),
                    image: line.image.clone(),
                });
            }
        }

        plan.grants.retain(|grant| !grant.cards.is_empty());

        plan
    }
}
