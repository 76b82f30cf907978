//! Cancel Order Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::models::Actor;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Cancel Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelOrderRequest {
    /// Why the order is cancelled
    pub reason: String,

    /// `customer` unless given
    #[serde(default)]
    pub actor: Option<String>,
}

/// Cancel Order Handler
///
/// Cancels an order that has not been delivered, cancelling its shipment
/// first when one is booked.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order cannot be cancelled"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Shipping provider request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.cancel",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<CancelOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let order = order.into_inner();
    let request = json.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let reason = request.reason.trim();

    if reason.is_empty() {
        return Err(StatusError::bad_request().brief("A cancellation reason is required"));
    }

    let actor = request
        .actor
        .as_deref()
        .map(str::parse::<Actor>)
        .transpose()
        .or_400("unknown actor")?
        .unwrap_or(Actor::Customer);

    let cancelled = state
        .app
        .orders
        .cancel(order.into(), reason, actor)
        .await
        .map_err(into_status_error)?;

    tracing::info!(order_uuid = %order, actor = %actor, "cancelled order");

    Ok(Json(cancelled.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::orders::{
        MockOrdersService, OrdersServiceError, models::OrderStatus,
    };

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/{order}/cancel").post(handler))
    }

    #[tokio::test]
    async fn test_cancel_by_customer() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_cancel()
            .once()
            .withf(move |order, reason, actor| {
                order.into_uuid() == uuid && reason == "changed my mind" && *actor == Actor::Customer
            })
            .return_once(move |_, _, _| Ok(make_order(uuid)));

        let res = TestClient::post(format!("http://example.com/orders/{uuid}/cancel"))
            .json(&json!({ "reason": " changed my mind " }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_without_reason_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_cancel().never();

        let res = TestClient::post(format!("http://example.com/orders/{}/cancel", Uuid::now_v7()))
            .json(&json!({ "reason": "  " }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_delivered_order_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_cancel()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::NotCancellable(OrderStatus::Delivered)));

        let res = TestClient::post(format!("http://example.com/orders/{}/cancel", Uuid::now_v7()))
            .json(&json!({ "reason": "late", "actor": "admin" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
