//! Guest identity resolution.
//!
//! Maps the buyer token and checkout contact onto a durable account, creating
//! one for first-time guests. Concurrent checkouts for the same contact race on
//! the unique email/phone constraints; the loser re-reads the winner's row.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::domain::{
    accounts::{
        AccountsService, AccountsServiceError,
        credentials::generated_credential_hash,
        models::{Account, AccountUuid, CheckoutContact, NewAccount},
    },
    identity::{
        errors::IdentityError,
        models::{BuyerRef, ResolvedBuyer, username_base, username_with_suffix},
    },
};

const CREATE_ATTEMPTS: u32 = 3;

pub struct GuestIdentityResolver {
    accounts: Arc<dyn AccountsService>,
}

impl fmt::Debug for GuestIdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestIdentityResolver").finish_non_exhaustive()
    }
}

impl GuestIdentityResolver {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountsService>) -> Self {
        Self { accounts }
    }

    async fn find_by_contact(
        &self,
        contact: &CheckoutContact,
    ) -> Result<Option<Account>, IdentityError> {
        Ok(self
            .accounts
            .find_by_contact(contact.normalized_email(), contact.normalized_phone())
            .await?)
    }

    async fn find_or_create(
        &self,
        contact: &CheckoutContact,
    ) -> Result<(AccountUuid, bool), IdentityError> {
        if let Some(existing) = self.find_by_contact(contact).await? {
            return Ok((existing.uuid, false));
        }

        if !contact.has_identity_key() {
            return Err(IdentityError::MissingContact);
        }

        let base = username_base(contact);

        for attempt in 0..CREATE_ATTEMPTS {
            let suffix = Timestamp::now()
                .as_millisecond()
                .saturating_add(i64::from(attempt));

            let new_account = NewAccount {
                uuid: AccountUuid::new(),
                username: username_with_suffix(&base, &suffix.to_string()),
                email: contact.normalized_email(),
                phone: contact.normalized_phone(),
                credential_hash: generated_credential_hash(),
                email_verified: true,
            };

            match self.accounts.create_account(new_account).await {
                Ok(created) => {
                    info!(account = %created.uuid, username = %created.username, "created guest account");

                    return Ok((created.uuid, true));
                }
                Err(AccountsServiceError::AlreadyExists) => {
                    if let Some(winner) = self.find_by_contact(contact).await? {
                        return Ok((winner.uuid, false));
                    }

                    warn!(attempt, "username collision creating guest account");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(IdentityError::UsernameExhausted)
    }
}

#[async_trait]
impl IdentityService for GuestIdentityResolver {
    async fn resolve(
        &self,
        token: Option<String>,
        contact: CheckoutContact,
    ) -> Result<ResolvedBuyer, IdentityError> {
        let registered = match BuyerRef::from_token(token.as_deref(), contact.clone()) {
            BuyerRef::Registered(account) => {
                let found = self.accounts.find_account(account).await?;

                if found.is_none() {
                    warn!(%account, "buyer token names an unknown account, falling back to contact");
                }

                found.map(|account| account.uuid)
            }
            BuyerRef::Guest(_) => None,
        };

        let (account, is_new_account) = match registered {
            Some(account) => (account, false),
            None => self.find_or_create(&contact).await?,
        };

        let session_token = if is_new_account || !self.accounts.has_session(account).await? {
            Some(self.accounts.issue_session(account).await?)
        } else {
            None
        };

        Ok(ResolvedBuyer {
            account,
            is_new_account,
            session_token,
        })
    }
}

#[automock]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve a buyer token and checkout contact to an account.
    async fn resolve(
        &self,
        token: Option<String>,
        contact: CheckoutContact,
    ) -> Result<ResolvedBuyer, IdentityError>;
}
