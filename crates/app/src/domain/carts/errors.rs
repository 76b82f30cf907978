//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{catalog::CatalogServiceError, coupons::CouponsServiceError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart or cart line not found")]
    NotFound,

    #[error("referenced product or collection not found")]
    ReferenceNotFound,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("insufficient stock")]
    InsufficientStock,

    #[error("collection cannot be purchased directly")]
    NotPurchasable,

    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Coupon(#[from] CouponsServiceError),

    #[error("cart already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("catalog error")]
    Catalog(#[source] CatalogServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<CatalogServiceError> for CartsServiceError {
    fn from(error: CatalogServiceError) -> Self {
        match error {
            CatalogServiceError::NotFound => Self::ReferenceNotFound,
            other @ CatalogServiceError::Sql(_) => Self::Catalog(other),
        }
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
