//! Get Order Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Get Order Handler
///
/// Returns an order with its lines and status history.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use crate::{
        errors::ErrorResponse,
        test_helpers::{make_order, orders_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn test_get_order_returns_200() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |order| order.into_uuid() == uuid)
            .return_once(move |_| Ok(make_order(uuid)));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid);
        assert_eq!(body.order_number, "ORD-2026-0001");
        assert_eq!(body.status, "confirmed");
        assert_eq!(body.total_amount, 99_800);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404_json() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let mut res = TestClient::get(format!("http://example.com/orders/{}", Uuid::now_v7()))
            .send(&make_service(orders))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert!(!body.success, "expected success to be false");
        assert_eq!(body.message, "Order not found");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_invalid_uuid_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_get_order().never();

        let res = TestClient::get("http://example.com/orders/not-a-uuid")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
