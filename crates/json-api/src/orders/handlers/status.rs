//! Update Order Status Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::models::{Actor, OrderStatus};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// Target status, e.g. `processing` or `shipped`
    pub status: String,

    /// Recorded in the order history
    #[serde(default)]
    pub note: String,

    /// `admin` unless given
    #[serde(default)]
    pub actor: Option<String>,
}

/// Update Order Status Handler
///
/// Moves an order along its lifecycle. Illegal transitions are rejected.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Illegal transition"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.update_status",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let order = order.into_inner();
    let request = json.into_inner();

    let status = request
        .status
        .parse::<OrderStatus>()
        .or_400("unknown order status")?;

    let actor = request
        .actor
        .as_deref()
        .map(str::parse::<Actor>)
        .transpose()
        .or_400("unknown actor")?
        .unwrap_or(Actor::Admin);

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("status", tracing::field::display(status));

    let updated = state
        .app
        .orders
        .update_status(order.into(), status, &request.note, actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use crate::{
        errors::ErrorResponse,
        test_helpers::{make_order, orders_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/{order}/status").put(handler))
    }

    #[tokio::test]
    async fn test_update_status_defaults_to_admin() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(move |order, status, note, actor| {
                order.into_uuid() == uuid
                    && *status == OrderStatus::Processing
                    && note == "packed"
                    && *actor == Actor::Admin
            })
            .return_once(move |_, _, _, _| Ok(make_order(uuid)));

        let res = TestClient::put(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "processing", "note": "packed" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "teleported" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_transition_returns_400_with_reason() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().once().return_once(|_, _, _, _| {
            Err(OrdersServiceError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Delivered,
            })
        });

        let mut res =
            TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
                .json(&json!({ "status": "delivered" }))
                .send(&make_service(orders))
                .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "cannot move order from confirmed to delivered");

        Ok(())
    }
}
