//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::{carts::CartsServiceError, coupons::CouponsServiceError};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart line not found"),
        CartsServiceError::ReferenceNotFound => {
            StatusError::not_found().brief("Product or collection not found")
        }
        error @ (CartsServiceError::InvalidQuantity
        | CartsServiceError::InsufficientStock
        | CartsServiceError::NotPurchasable
        | CartsServiceError::EmptyCart) => StatusError::bad_request().brief(error.to_string()),
        CartsServiceError::Coupon(error) => coupon_status_error(error),
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Cart line already exists"),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => StatusError::bad_request().brief("Invalid cart payload"),
        CartsServiceError::Catalog(source) => {
            error!("failed to load catalog entry for cart: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Sql(source) => {
            error!("failed to update cart: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn coupon_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::DuplicateCoupon | CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon is already applied")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        error @ (CouponsServiceError::Inactive
        | CouponsServiceError::Expired
        | CouponsServiceError::UsageExceeded
        | CouponsServiceError::BelowMinimum { .. }
        | CouponsServiceError::InvalidCode) => StatusError::bad_request().brief(error.to_string()),
        CouponsServiceError::InvalidReference
        | CouponsServiceError::MissingRequiredData
        | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::Sql(source) => {
            error!("failed to apply coupon: {source}");

            StatusError::internal_server_error()
        }
    }
}
