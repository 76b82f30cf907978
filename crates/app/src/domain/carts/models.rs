//! Cart Models

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        catalog::models::{CollectionUuid, ProductUuid, UnknownKind},
        coupons::models::{AppliedCoupon, total_discount},
    },
    uuids::TypedUuid,
};

/// Fallback phone model when a line carries no variant selection.
pub const UNIVERSAL_PHONE_MODEL: &str = "Universal";

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// Cart Model
///
/// A cart is keyed by the buyer identifier the storefront holds: a registered
/// account id or a guest token.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub key: String,
    pub lines: Vec<CartLine>,
    pub coupons: Vec<AppliedCoupon>,
}

impl Cart {
    #[must_use]
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            lines: Vec::new(),
            coupons: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.lines
            .iter()
            .fold(0_u64, |sum, line| sum.saturating_add(line.line_total()))
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    #[must_use]
    pub fn discount_total(&self) -> u64 {
        total_discount(&self.coupons)
    }

    #[must_use]
    pub fn coupon_codes(&self) -> Vec<String> {
        self.coupons.iter().map(|c| c.code.clone()).collect()
    }
}

/// Storage discriminant of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartLineKind {
    Item,
    Collection,
    CustomDesign,
    SuggestedItem,
}

impl CartLineKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Collection => "collection",
            Self::CustomDesign => "custom_design",
            Self::SuggestedItem => "suggested_item",
        }
    }
}

impl FromStr for CartLineKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "item" => Ok(Self::Item),
            "collection" => Ok(Self::Collection),
            "custom_design" => Ok(Self::CustomDesign),
            "suggested_item" => Ok(Self::SuggestedItem),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for CartLineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a cart line refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    Item { product: ProductUuid },
    Collection { collection: CollectionUuid },
    CustomDesign { product: ProductUuid, design: CustomDesign },
    SuggestedItem { product: ProductUuid },
}

impl LineItem {
    #[must_use]
    pub const fn kind(&self) -> CartLineKind {
        match self {
            Self::Item { .. } => CartLineKind::Item,
            Self::Collection { .. } => CartLineKind::Collection,
            Self::CustomDesign { .. } => CartLineKind::CustomDesign,
            Self::SuggestedItem { .. } => CartLineKind::SuggestedItem,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Uuid {
        match self {
            Self::Item { product }
            | Self::CustomDesign { product, .. }
            | Self::SuggestedItem { product } => product.into_uuid(),
            Self::Collection { collection } => collection.into_uuid(),
        }
    }

    #[must_use]
    pub fn design(&self) -> Option<&CustomDesign> {
        match self {
            Self::CustomDesign { design, .. } => Some(design),
            Self::Item { .. } | Self::Collection { .. } | Self::SuggestedItem { .. } => None,
        }
    }

    /// Rebuild from the storage columns.
    #[must_use]
    pub fn from_parts(
        kind: CartLineKind,
        reference: Uuid,
        design: Option<CustomDesign>,
    ) -> Option<Self> {
        match kind {
            CartLineKind::Item => Some(Self::Item {
                product: ProductUuid::from_uuid(reference),
            }),
            CartLineKind::Collection => Some(Self::Collection {
                collection: CollectionUuid::from_uuid(reference),
            }),
            CartLineKind::SuggestedItem => Some(Self::SuggestedItem {
                product: ProductUuid::from_uuid(reference),
            }),
            CartLineKind::CustomDesign => design.map(|design| Self::CustomDesign {
                product: ProductUuid::from_uuid(reference),
                design,
            }),
        }
    }
}

/// A buyer-uploaded design printed onto a blank product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDesign {
    pub design_image_url: String,
    pub original_image_url: Option<String>,
    pub phone_model: Option<String>,
    pub transform: DesignTransform,
}

/// Placement of a design on the product template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for DesignTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Brand and model selected for a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl Variant {
    /// The model, else the brand, else [`UNIVERSAL_PHONE_MODEL`].
    #[must_use]
    pub fn phone_model(&self) -> String {
        self.model
            .as_deref()
            .filter(|model| !model.is_empty())
            .or_else(|| self.brand.as_deref().filter(|brand| !brand.is_empty()))
            .unwrap_or(UNIVERSAL_PHONE_MODEL)
            .to_string()
    }
}

/// Cart Line Model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub uuid: CartLineUuid,
    pub item: LineItem,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: u64,
    pub variant: Variant,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }

    /// Lines merge when they refer to the same thing in the same variant.
    #[must_use]
    pub fn merges_with(&self, item: &LineItem, variant: &Variant) -> bool {
        self.item == *item && self.variant == *variant
    }
}

/// New Cart Line Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub item: LineItem,
    pub quantity: u32,
    pub variant: Variant,
}
