//! Account Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::catalog::models::{CollectionUuid, ProductUuid},
    uuids::TypedUuid,
};

/// Account UUID
pub type AccountUuid = TypedUuid<Account>;

/// Account Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uuid: AccountUuid,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub score: u64,
    pub created_at: Timestamp,
}

/// New Account Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub uuid: AccountUuid,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub credential_hash: String,
    pub email_verified: bool,
}

/// Contact details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CheckoutContact {
    /// Lower-cased, trimmed email; `None` when blank.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_lowercase)
    }

    /// Trimmed phone number; `None` when blank.
    #[must_use]
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string)
    }

    #[must_use]
    pub fn has_identity_key(&self) -> bool {
        self.normalized_email().is_some() || self.normalized_phone().is_some()
    }
}

/// A card granted from a gaming collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamingCard {
    pub product: ProductUuid,
    pub name: String,
    pub image: Option<String>,
}

/// Cards granted from one collection by one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamingCollectionGrant {
    pub collection: CollectionUuid,
    pub collection_name: String,
    pub collection_image: Option<String>,
    pub cards: Vec<GamingCard>,
}

/// Score is the sum of the levels of every owned card.
#[must_use]
pub fn score_from_levels(levels: &[u32]) -> u64 {
    levels.iter().map(|level| u64::from(*level)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sums_every_owned_level() {
        assert_eq!(score_from_levels(&[3, 4]), 7);
        assert_eq!(score_from_levels(&[]), 0);
    }

    #[test]
    fn blank_contact_fields_are_ignored() {
        let contact = CheckoutContact {
            name: None,
            email: Some("  ".to_string()),
            phone: Some(" 9876543210 ".to_string()),
        };

        assert_eq!(contact.normalized_email(), None);
        assert_eq!(contact.normalized_phone().as_deref(), Some("9876543210"));
        assert!(contact.has_identity_key());
        assert!(!CheckoutContact::default().has_identity_key());
    }

    #[test]
    fn email_is_case_folded() {
        let contact = CheckoutContact {
            email: Some("Asha@Example.COM".to_string()),
            ..CheckoutContact::default()
        };

        assert_eq!(contact.normalized_email().as_deref(), Some("asha@example.com"));
    }
}
