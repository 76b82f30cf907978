//! Create Checkout Intent Handler

use salvo::{oapi::extract::JsonBody, prelude::*};

use storefront_app::domain::orders::models::PaymentMethod;

use crate::{
    checkout::{
        errors::into_status_error,
        models::{CartKeyRequest, CheckoutIntentResponse},
    },
    extensions::*,
};

use super::record_failure;

const OPERATION: &str = "intent";

/// Create Checkout Intent Handler
///
/// Opens a payment gateway intent sized from the server-side cart. The client
/// never supplies the amount.
#[endpoint(
    tags("checkout"),
    summary = "Create Checkout Intent",
    responses(
        (status_code = StatusCode::CREATED, description = "Intent created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.intent",
    skip(json, depot, res),
    fields(cart_key = tracing::field::Empty, request_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CartKeyRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CheckoutIntentResponse>, StatusError> {
    let state = depot.state()?;
    let cart_key = json.into_inner().cart_key;
    let span = tracing::Span::current();

    span.record("cart_key", cart_key.as_str());

    if let Some(request_id) = depot.request_id() {
        span.record("request_id", request_id);
    }

    let intent = state
        .app
        .checkout
        .create_intent(&cart_key)
        .await
        .map_err(|error| {
            record_failure(OPERATION, PaymentMethod::Gateway, into_status_error(error))
        })?;

    tracing::info!(
        intent_id = %intent.gateway_intent_id,
        amount = intent.quote.total_amount,
        currency = %intent.currency,
        "created checkout intent"
    );

    res.status_code(StatusCode::CREATED);

    Ok(Json(intent.into()))
}
