//! Checkout Handlers

use salvo::http::StatusError;

use storefront_app::domain::orders::models::PaymentMethod;

use crate::observability::{CheckoutOutcome, record_checkout};

pub(crate) mod cod;
pub(crate) mod intent;
pub(crate) mod quote;
pub(crate) mod verify;

/// Count a checkout that ended in an error response.
fn record_failure(
    operation: &str,
    payment_method: PaymentMethod,
    error: StatusError,
) -> StatusError {
    let outcome = if error.code.is_client_error() {
        CheckoutOutcome::Rejected
    } else {
        CheckoutOutcome::Failed
    };

    record_checkout(operation, outcome, Some(payment_method));

    error
}
