//! Create Shipment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Create Shipment Handler
///
/// Books a forward shipment with the dispatcher and stores the waybill on
/// the order.
#[endpoint(
    tags("orders"),
    summary = "Create Shipment",
    responses(
        (status_code = StatusCode::CREATED, description = "Shipment booked"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order already has a shipment"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Shipping provider request failed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Shipping is not configured"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.shipment.create",
    skip(order, depot, res),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let order = order.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let shipped = state
        .app
        .orders
        .create_shipment(order.into())
        .await
        .map_err(into_status_error)?;

    if let Some(shipment) = &shipped.shipment {
        tracing::info!(order_uuid = %order, awb = %shipment.awb_code, "booked shipment");
    }

    res.status_code(StatusCode::CREATED);

    Ok(Json(shipped.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::{
        domain::orders::{MockOrdersService, OrdersServiceError},
        gateways::shipping::ShipmentError,
    };

    use crate::{
        errors::ErrorResponse,
        test_helpers::{make_order, orders_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(
            orders,
            Router::with_path("orders/{order}/shipment").post(handler),
        )
    }

    #[tokio::test]
    async fn test_create_shipment_returns_201() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_shipment()
            .once()
            .withf(move |order| order.into_uuid() == uuid)
            .return_once(move |_| Ok(make_order(uuid)));

        let res = TestClient::post(format!("http://example.com/orders/{uuid}/shipment"))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_shipment_without_credentials_returns_503() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_create_shipment().once().return_once(|_| {
            Err(OrdersServiceError::Shipment(ShipmentError::NotConfigured))
        });

        let mut res =
            TestClient::post(format!("http://example.com/orders/{}/shipment", Uuid::now_v7()))
                .send(&make_service(orders))
                .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(body.message, "Shipping is not configured");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_shipment_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_shipment()
            .once()
            .return_once(|_| Err(OrdersServiceError::ShipmentExists));

        let res =
            TestClient::post(format!("http://example.com/orders/{}/shipment", Uuid::now_v7()))
                .send(&make_service(orders))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
