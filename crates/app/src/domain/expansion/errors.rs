//! Collection expansion errors.

use thiserror::Error;

use crate::domain::{accounts::AccountsServiceError, catalog::CatalogServiceError};

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("collection not found")]
    NotFound,

    #[error("collection has no eligible members")]
    NoEligibleMembers,

    #[error(transparent)]
    Catalog(CatalogServiceError),

    #[error(transparent)]
    Accounts(#[from] AccountsServiceError),
}

impl From<CatalogServiceError> for ExpansionError {
    fn from(error: CatalogServiceError) -> Self {
        match error {
            CatalogServiceError::NotFound => Self::NotFound,
            other @ CatalogServiceError::Sql(_) => Self::Catalog(other),
        }
    }
}
