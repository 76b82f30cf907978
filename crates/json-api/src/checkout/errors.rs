//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::{
    checkout::{CheckoutError, IntentsServiceError},
    expansion::ExpansionError,
    identity::IdentityError,
};

use crate::{carts, orders};

pub(crate) fn into_status_error(error: CheckoutError) -> StatusError {
    match error {
        CheckoutError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutError::ProofMismatch => {
            StatusError::bad_request().brief("Payment proof does not match the checkout intent")
        }
        error @ CheckoutError::IncompleteAddress(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        CheckoutError::PaymentNotCompleted(_) => {
            StatusError::bad_request().brief("Payment not completed")
        }
        CheckoutError::Carts(error) => carts::errors::into_status_error(error),
        CheckoutError::Intents(IntentsServiceError::NotFound) => {
            StatusError::not_found().brief("Checkout intent not found")
        }
        CheckoutError::Intents(error) => {
            error!("checkout intent storage failed: {error}");

            StatusError::internal_server_error()
        }
        CheckoutError::Gateway(error) => {
            error!("payment gateway request failed: {error}");

            StatusError::bad_gateway().brief("Payment gateway request failed")
        }
        CheckoutError::Identity(error @ IdentityError::MissingContact) => {
            StatusError::bad_request().brief(error.to_string())
        }
        CheckoutError::Identity(error) => {
            error!("buyer resolution failed: {error}");

            StatusError::internal_server_error()
        }
        CheckoutError::Expansion(ExpansionError::NotFound) => {
            StatusError::not_found().brief("Collection not found")
        }
        CheckoutError::Expansion(error @ ExpansionError::NoEligibleMembers) => {
            StatusError::bad_request().brief(error.to_string())
        }
        CheckoutError::Expansion(error) => {
            error!("collection expansion failed: {error}");

            StatusError::internal_server_error()
        }
        CheckoutError::Orders(error) => orders::errors::into_status_error(error),
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use storefront_app::{
        domain::{carts::CartsServiceError, orders::OrdersServiceError},
        gateways::payments::PaymentGatewayError,
    };

    use super::*;

    #[test]
    fn incomplete_address_names_the_field() {
        let error = into_status_error(CheckoutError::IncompleteAddress("zip_code"));

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
        assert_eq!(error.brief, "shipping address is incomplete: zip_code");
    }

    #[test]
    fn gateway_failures_are_bad_gateway() {
        let error = into_status_error(CheckoutError::Gateway(
            PaymentGatewayError::UnexpectedResponse("boom".to_string()),
        ));

        assert_eq!(error.code, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unknown_intent_is_not_found() {
        let error = into_status_error(CheckoutError::Intents(IntentsServiceError::NotFound));

        assert_eq!(error.code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn nested_errors_use_their_resource_mapping() {
        let stock = into_status_error(CheckoutError::Carts(CartsServiceError::InsufficientStock));
        let order = into_status_error(CheckoutError::Orders(OrdersServiceError::NotFound));

        assert_eq!(stock.code, StatusCode::BAD_REQUEST);
        assert_eq!(order.code, StatusCode::NOT_FOUND);
    }
}
