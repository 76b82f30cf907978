//! Identity Models

use crate::domain::accounts::models::{AccountUuid, CheckoutContact};

/// Token value the storefront sends for anonymous buyers.
pub const GUEST_TOKEN: &str = "guest";

/// Prefix of per-browser guest tokens.
pub const GUEST_TOKEN_PREFIX: &str = "guest_";

/// Username used when the contact carries nothing usable.
pub const FALLBACK_USERNAME: &str = "guest";

const USERNAME_BASE_MAX: usize = 80;

/// Who is checking out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuyerRef {
    Registered(AccountUuid),
    Guest(CheckoutContact),
}

impl BuyerRef {
    /// Classify a buyer token. Missing, guest-shaped and malformed tokens are
    /// all guests identified by their contact details.
    #[must_use]
    pub fn from_token(token: Option<&str>, contact: CheckoutContact) -> Self {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return Self::Guest(contact);
        };

        if token == GUEST_TOKEN || token.starts_with(GUEST_TOKEN_PREFIX) {
            return Self::Guest(contact);
        }

        token
            .parse::<AccountUuid>()
            .map_or(Self::Guest(contact), Self::Registered)
    }
}

/// Outcome of resolving a buyer to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuyer {
    pub account: AccountUuid,
    pub is_new_account: bool,
    pub session_token: Option<String>,
}

/// Base of a generated username: the email local part, else the name.
#[must_use]
pub fn username_base(contact: &CheckoutContact) -> String {
    let email_local = contact
        .normalized_email()
        .and_then(|email| email.split('@').next().map(str::to_string));

    let raw = email_local
        .or_else(|| contact.name.clone())
        .unwrap_or_default();

    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(USERNAME_BASE_MAX)
        .collect();

    if cleaned.chars().count() < 2 {
        FALLBACK_USERNAME.to_string()
    } else {
        cleaned
    }
}

#[must_use]
pub fn username_with_suffix(base: &str, suffix: &str) -> String {
    format!("{base}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: Option<&str>, email: Option<&str>) -> CheckoutContact {
        CheckoutContact {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            phone: None,
        }
    }

    #[test]
    fn guest_tokens_resolve_to_guests() {
        for token in [None, Some(""), Some("guest"), Some("guest_17a9"), Some("not-a-uuid")] {
            assert_eq!(
                BuyerRef::from_token(token, CheckoutContact::default()),
                BuyerRef::Guest(CheckoutContact::default()),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn account_ids_resolve_to_registered() {
        let account = AccountUuid::new();

        assert_eq!(
            BuyerRef::from_token(Some(&account.to_string()), CheckoutContact::default()),
            BuyerRef::Registered(account)
        );
    }

    #[test]
    fn username_prefers_email_local_part() {
        assert_eq!(
            username_base(&contact(Some("Asha Rao"), Some("Asha.Rao@example.com"))),
            "asha.rao"
        );
        assert_eq!(username_base(&contact(Some("Asha Rao"), None)), "Asha_Rao");
        assert_eq!(username_base(&contact(None, None)), FALLBACK_USERNAME);
        assert_eq!(username_with_suffix("asha", "42"), "asha_42");
    }
}
