//! Get Cart Handler

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Get Cart Handler
///
/// Returns the cart for a buyer key. A key with no cart reads as empty.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    key: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;

    let cart = state
        .app
        .carts
        .get_cart(&key.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
