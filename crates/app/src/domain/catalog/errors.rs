//! Catalog service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("catalog entry not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CatalogServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            other => Self::Sql(other),
        }
    }
}
