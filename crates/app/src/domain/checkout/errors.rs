//! Checkout errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::{
        carts::CartsServiceError, expansion::ExpansionError, identity::IdentityError,
        orders::OrdersServiceError,
    },
    gateways::payments::{IntentStatus, PaymentGatewayError},
};

#[derive(Debug, Error)]
pub enum IntentsServiceError {
    #[error("checkout intent not found")]
    NotFound,

    #[error("checkout intent already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for IntentsServiceError {
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

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("payment proof does not match the checkout intent")]
    ProofMismatch,

    #[error("shipping address is incomplete: {0}")]
    IncompleteAddress(&'static str),

    #[error("payment has not completed")]
    PaymentNotCompleted(IntentStatus),

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error(transparent)]
    Intents(#[from] IntentsServiceError),

    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),
}
