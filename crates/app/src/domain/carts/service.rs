//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartLine, CartLineUuid, LineItem, NewCartLine},
            repositories::{PgCartLinesRepository, PgCartsRepository},
        },
        catalog::{CatalogService, models::Product},
        coupons::{CouponsService, CouponsServiceError, models::{AppliedCoupon, normalize_code}},
    },
};

/// Catalog facts a new cart line is priced from.
struct PricedLine {
    name: String,
    image: Option<String>,
    unit_price: u64,
    product: Option<Product>,
}

pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    lines: PgCartLinesRepository,
    catalog: Arc<dyn CatalogService>,
    coupons: Arc<dyn CouponsService>,
}

impl fmt::Debug for PgCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCartsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgCartsService {
    #[must_use]
    pub fn new(
        db: Db,
        catalog: Arc<dyn CatalogService>,
        coupons: Arc<dyn CouponsService>,
    ) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            lines: PgCartLinesRepository::new(),
            catalog,
            coupons,
        }
    }

    async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<Cart, sqlx::Error> {
        let Some(cart) = self.carts.find_cart(tx, key).await? else {
            return Ok(Cart::empty(key));
        };

        Ok(Cart {
            key: key.to_string(),
            lines: self.lines.list_lines(tx, cart).await?,
            coupons: self.carts.list_coupons(tx, cart).await?,
        })
    }

    async fn price_line(&self, item: &LineItem) -> Result<PricedLine, CartsServiceError> {
        match item {
            LineItem::Item { product }
            | LineItem::SuggestedItem { product }
            | LineItem::CustomDesign { product, .. } => {
                let product = self.catalog.get_product(*product).await?;

                Ok(PricedLine {
                    name: product.name.clone(),
                    image: product.image.clone(),
                    unit_price: product.price,
                    product: Some(product),
                })
            }
            LineItem::Collection { collection } => {
                let collection = self.catalog.get_collection(*collection).await?;

                let unit_price = collection
                    .base_price
                    .ok_or(CartsServiceError::NotPurchasable)?;

                Ok(PricedLine {
                    name: collection.name,
                    image: collection.image,
                    unit_price,
                    product: None,
                })
            }
        }
    }

    async fn product_for(&self, item: &LineItem) -> Result<Option<Product>, CartsServiceError> {
        match item {
            LineItem::Item { product }
            | LineItem::SuggestedItem { product }
            | LineItem::CustomDesign { product, .. } => {
                Ok(Some(self.catalog.get_product(*product).await?))
            }
            LineItem::Collection { .. } => Ok(None),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, key: &str) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.load(&mut tx, key).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn add_line(&self, key: &str, line: NewCartLine) -> Result<Cart, CartsServiceError> {
        if line.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let priced = self.price_line(&line.item).await?;

        let mut tx = self.db.begin().await?;

        let cart = self.carts.ensure_cart(&mut tx, key).await?;
        let existing = self.lines.list_lines(&mut tx, cart).await?;

        if let Some(current) = existing
            .iter()
            .find(|current| current.merges_with(&line.item, &line.variant))
        {
            let quantity = current.quantity.saturating_add(line.quantity);

            ensure_stock(priced.product.as_ref(), quantity)?;

            self.lines
                .update_quantity(&mut tx, cart, current.uuid, quantity)
                .await?;
        } else {
            ensure_stock(priced.product.as_ref(), line.quantity)?;

            let new_line = CartLine {
                uuid: CartLineUuid::new(),
                item: line.item,
                name: priced.name,
                image: priced.image,
                quantity: line.quantity,
                unit_price: priced.unit_price,
                variant: line.variant,
            };

            self.lines.insert_line(&mut tx, cart, &new_line).await?;
        }

        let updated = self.load(&mut tx, key).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn update_quantity(
        &self,
        key: &str,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let current = self.get_cart(key).await?;

        let target = current
            .lines
            .iter()
            .find(|candidate| candidate.uuid == line)
            .ok_or(CartsServiceError::NotFound)?;

        ensure_stock(self.product_for(&target.item).await?.as_ref(), quantity)?;

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, key)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        if self
            .lines
            .update_quantity(&mut tx, cart, line, quantity)
            .await?
            == 0
        {
            return Err(CartsServiceError::NotFound);
        }

        let updated = self.load(&mut tx, key).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn remove_line(&self, key: &str, line: CartLineUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, key)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        if self.lines.delete_line(&mut tx, cart, line).await? == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let updated = self.load(&mut tx, key).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn apply_coupon(&self, key: &str, code: &str) -> Result<AppliedCoupon, CartsServiceError> {
        let current = self.get_cart(key).await?;

        if current.is_empty() {
            return Err(CartsServiceError::EmptyCart);
        }

        let applied = self
            .coupons
            .validate(code, current.subtotal(), &current.coupon_codes())
            .await?;

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, key)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        self.carts
            .insert_coupon(&mut tx, cart, &applied)
            .await
            .map_err(|error| match CartsServiceError::from(error) {
                CartsServiceError::AlreadyExists => {
                    CartsServiceError::Coupon(CouponsServiceError::DuplicateCoupon)
                }
                other => other,
            })?;

        tx.commit().await?;

        Ok(applied)
    }

    async fn remove_coupon(&self, key: &str, code: &str) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, key)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        if self
            .carts
            .delete_coupon(&mut tx, cart, &normalize_code(code))
            .await?
            == 0
        {
            return Err(CartsServiceError::NotFound);
        }

        let updated = self.load(&mut tx, key).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn clear(&self, key: &str) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        if let Some(cart) = self.carts.find_cart(&mut tx, key).await? {
            self.lines.clear_lines(&mut tx, cart).await?;
            self.carts.clear_coupons(&mut tx, cart).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn merge(&self, from_key: &str, into_key: &str) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        if from_key == into_key {
            let cart = self.load(&mut tx, into_key).await?;

            tx.commit().await?;

            return Ok(cart);
        }

        if let Some(from) = self.carts.find_cart(&mut tx, from_key).await? {
            let incoming = self.lines.list_lines(&mut tx, from).await?;
            let into = self.carts.ensure_cart(&mut tx, into_key).await?;
            let existing = self.lines.list_lines(&mut tx, into).await?;

            for line in incoming {
                if let Some(current) = existing
                    .iter()
                    .find(|current| current.merges_with(&line.item, &line.variant))
                {
                    self.lines
                        .update_quantity(
                            &mut tx,
                            into,
                            current.uuid,
                            current.quantity.saturating_add(line.quantity),
                        )
                        .await?;
                } else {
                    let moved = CartLine {
                        uuid: CartLineUuid::new(),
                        ..line
                    };

                    self.lines.insert_line(&mut tx, into, &moved).await?;
                }
            }

            // Guest coupons were priced against the guest subtotal and are dropped.
            self.carts.delete_cart(&mut tx, from).await?;

            info!(from = from_key, into = into_key, "merged carts");
        }

        let merged = self.load(&mut tx, into_key).await?;

        tx.commit().await?;

        Ok(merged)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the cart for a buyer key; a missing cart reads as empty.
    async fn get_cart(&self, key: &str) -> Result<Cart, CartsServiceError>;

    /// Add a line priced from the catalog, merging with a matching line.
    async fn add_line(&self, key: &str, line: NewCartLine) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of an existing line.
    async fn update_quantity(
        &self,
        key: &str,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line.
    async fn remove_line(&self, key: &str, line: CartLineUuid) -> Result<Cart, CartsServiceError>;

    /// Validate a coupon against the current subtotal and store its snapshot.
    async fn apply_coupon(&self, key: &str, code: &str) -> Result<AppliedCoupon, CartsServiceError>;

    /// Remove an applied coupon.
    async fn remove_coupon(&self, key: &str, code: &str) -> Result<Cart, CartsServiceError>;

    /// Empty the cart of lines and coupons.
    async fn clear(&self, key: &str) -> Result<(), CartsServiceError>;

    /// Move the lines of one cart into another.
    async fn merge(&self, from_key: &str, into_key: &str) -> Result<Cart, CartsServiceError>;
}

fn ensure_stock(product: Option<&Product>, quantity: u32) -> Result<(), CartsServiceError> {
    match product {
        Some(product) if !product.has_stock_for(quantity) => {
            Err(CartsServiceError::InsufficientStock)
        }
        Some(_) | None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::catalog::models::{ProductKind, ProductUuid};

    use super::*;

    fn product(stock: Option<u32>) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: "Wrap".to_string(),
            kind: ProductKind::Standard,
            level: None,
            price: 499,
            image: None,
            stock,
        }
    }

    #[test]
    fn stock_is_checked_against_requested_quantity() {
        let limited = product(Some(2));

        assert!(ensure_stock(Some(&limited), 2).is_ok());

        let result = ensure_stock(Some(&limited), 3);

        assert!(
            matches!(result, Err(CartsServiceError::InsufficientStock)),
            "expected InsufficientStock, got {result:?}"
        );
    }

    #[test]
    fn collections_and_untracked_products_skip_stock_checks() {
        assert!(ensure_stock(None, 50).is_ok());
        assert!(ensure_stock(Some(&product(None)), 50).is_ok());
    }
}
