//! Track Shipment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::TrackingStatusResponse},
};

/// Track Shipment Handler
///
/// Asks the dispatcher for the latest status of the order's waybill.
#[endpoint(
    tags("orders"),
    summary = "Track Shipment",
    responses(
        (status_code = StatusCode::OK, description = "Tracking status"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or shipment not found"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Shipping provider request failed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Shipping is not configured"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<TrackingStatusResponse>, StatusError> {
    let state = depot.state()?;

    let tracking = state
        .app
        .orders
        .track_shipment(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(tracking.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::{
        domain::orders::{MockOrdersService, OrdersServiceError},
        gateways::shipping::TrackingStatus,
    };

    use crate::test_helpers::orders_service;

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(
            orders,
            Router::with_path("orders/{order}/shipment").get(handler),
        )
    }

    #[tokio::test]
    async fn test_track_shipment_returns_status() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_track_shipment().once().return_once(|_| {
            Ok(TrackingStatus {
                awb_code: "AWB1".to_string(),
                status: Some("In Transit".to_string()),
                details: json!({ "status": "success" }),
            })
        });

        let mut res =
            TestClient::get(format!("http://example.com/orders/{}/shipment", Uuid::now_v7()))
                .send(&make_service(orders))
                .await;

        let body: TrackingStatusResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.awb_code, "AWB1");
        assert_eq!(body.status.as_deref(), Some("In Transit"));

        Ok(())
    }

    #[tokio::test]
    async fn test_track_without_shipment_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_track_shipment()
            .once()
            .return_once(|_| Err(OrdersServiceError::NoShipment));

        let res =
            TestClient::get(format!("http://example.com/orders/{}/shipment", Uuid::now_v7()))
                .send(&make_service(orders))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
