//! Apply Coupon Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, models::AppliedCouponResponse},
    extensions::*,
};

/// Apply Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponRequest {
    /// Coupon code, case-insensitive
    pub code: String,
}

/// Apply Coupon Handler
///
/// Validates the coupon against the current subtotal and freezes its discount
/// on the cart.
#[endpoint(
    tags("carts"),
    summary = "Apply Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon applied"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Coupon already applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Coupon rejected"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "carts.coupons.apply", skip(key, json, depot, res), err)]
pub(crate) async fn handler(
    key: PathParam<String>,
    json: JsonBody<ApplyCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AppliedCouponResponse>, StatusError> {
    let state = depot.state()?;
    let key = key.into_inner();
    let code = json.into_inner().code;

    let applied = state
        .app
        .carts
        .apply_coupon(&key, &code)
        .await
        .map_err(into_status_error)?;

    tracing::info!(
        cart_key = %key,
        code = %applied.code,
        discount = applied.discount_amount,
        "applied coupon"
    );

    res.status_code(StatusCode::CREATED);

    Ok(Json(applied.into()))
}
