//! Cash On Delivery Handler

use salvo::{oapi::extract::JsonBody, prelude::*};

use storefront_app::domain::orders::models::PaymentMethod;

use crate::{
    checkout::{
        errors::into_status_error,
        models::{CashOnDeliveryRequest, CheckoutResponse},
    },
    extensions::*,
    observability::{CheckoutOutcome, record_checkout},
};

use super::record_failure;

const OPERATION: &str = "cod";

/// Cash On Delivery Handler
///
/// Places a confirmed order with payment pending. Nothing is unlocked until
/// the order is delivered.
#[endpoint(
    tags("checkout"),
    summary = "Place Cash On Delivery Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart or incomplete address"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.cod",
    skip(json, depot, res),
    fields(cart_key = tracing::field::Empty, request_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CashOnDeliveryRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.state()?;
    let (cart_key, request) = json.into_inner().into_parts();
    let span = tracing::Span::current();

    span.record("cart_key", cart_key.as_str());

    if let Some(request_id) = depot.request_id() {
        span.record("request_id", request_id);
    }

    let placed = state
        .app
        .checkout
        .place_cash_on_delivery(&cart_key, request)
        .await
        .map_err(|error| {
            record_failure(
                OPERATION,
                PaymentMethod::CashOnDelivery,
                into_status_error(error),
            )
        })?;

    record_checkout(
        OPERATION,
        CheckoutOutcome::Placed,
        Some(PaymentMethod::CashOnDelivery),
    );

    tracing::info!(
        order_number = %placed.order.order_number,
        total_amount = placed.order.total_amount,
        "placed cash on delivery order"
    );

    res.status_code(StatusCode::CREATED);

    Ok(Json(CheckoutResponse::placed(
        placed,
        "Order placed successfully",
    )))
}
