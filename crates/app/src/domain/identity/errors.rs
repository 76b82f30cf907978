//! Identity resolution errors.

use thiserror::Error;

use crate::domain::accounts::AccountsServiceError;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("an email address or phone number is required")]
    MissingContact,

    #[error("could not allocate a unique username")]
    UsernameExhausted,

    #[error(transparent)]
    Accounts(#[from] AccountsServiceError),
}
