//! Catalog Models

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Number of distinct cards that make up a full gaming collection.
pub const COMPLETE_SET_SIZE: usize = 5;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Collection UUID
pub type CollectionUuid = TypedUuid<Collection>;

#[derive(Debug, Error)]
#[error("unknown catalog kind: {0}")]
pub struct UnknownKind(pub String);

/// Product Kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Gaming,
    Standard,
}

impl ProductKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gaming => "gaming",
            Self::Standard => "standard",
        }
    }
}

impl FromStr for ProductKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gaming" => Ok(Self::Gaming),
            "standard" => Ok(Self::Standard),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub kind: ProductKind,
    pub level: Option<u32>,
    pub price: u64,
    pub image: Option<String>,
    pub stock: Option<u32>,
}

impl Product {
    /// Gaming products with a level are the only cards a collection can grant.
    #[must_use]
    pub fn is_collectible(&self) -> bool {
        self.kind == ProductKind::Gaming && self.level.is_some()
    }

    /// Whether `quantity` units can be sold. Products without tracked stock are unlimited.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock.is_none_or(|stock| stock >= quantity)
    }
}

/// Collection Kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Gaming,
    Normal,
}

impl CollectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gaming => "gaming",
            Self::Normal => "normal",
        }
    }
}

impl FromStr for CollectionKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gaming" => Ok(Self::Gaming),
            "normal" => Ok(Self::Normal),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Collection Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub uuid: CollectionUuid,
    pub name: String,
    pub kind: CollectionKind,
    pub base_price: Option<u64>,
    pub image: Option<String>,
    pub members: Vec<Product>,
}

impl Collection {
    /// Members that can be granted as cards, in collection order.
    #[must_use]
    pub fn eligible_members(&self) -> Vec<&Product> {
        self.members
            .iter()
            .filter(|product| product.is_collectible())
            .collect()
    }
}
