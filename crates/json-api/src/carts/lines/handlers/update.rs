//! Update Cart Line Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Update Cart Line Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartLineRequest {
    /// New number of units, at least 1
    pub quantity: u32,
}

/// Update Cart Line Handler
#[endpoint(
    tags("carts"),
    summary = "Update Cart Line Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Line updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart line not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    key: PathParam<String>,
    line: PathParam<Uuid>,
    json: JsonBody<UpdateCartLineRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;

    let cart = state
        .app
        .carts
        .update_quantity(
            &key.into_inner(),
            line.into_inner().into(),
            json.into_inner().quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
