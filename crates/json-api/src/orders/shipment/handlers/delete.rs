//! Cancel Shipment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Cancel Shipment Handler
///
/// Cancels the booked waybill and clears it from the order.
#[endpoint(
    tags("orders"),
    summary = "Cancel Shipment",
    responses(
        (status_code = StatusCode::OK, description = "Shipment cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or shipment not found"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Shipping provider request failed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Shipping is not configured"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "orders.shipment.cancel", skip(order, depot), err)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;

    let order = state
        .app
        .orders
        .cancel_shipment(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    #[tokio::test]
    async fn test_cancel_shipment_returns_order_without_shipment() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_cancel_shipment()
            .once()
            .withf(move |order| order.into_uuid() == uuid)
            .return_once(move |_| Ok(make_order(uuid)));

        let service = orders_service(
            orders,
            Router::with_path("orders/{order}/shipment").delete(handler),
        );

        let mut res = TestClient::delete(format!("http://example.com/orders/{uuid}/shipment"))
            .send(&service)
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.shipment.is_none());

        Ok(())
    }
}
