//! Update Order Tracking Handler

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        models::{OrderResponse, TrackingPayload},
    },
};

/// Update Order Tracking Handler
///
/// Stores manually entered tracking details.
#[endpoint(
    tags("orders"),
    summary = "Update Order Tracking",
    responses(
        (status_code = StatusCode::OK, description = "Tracking updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<TrackingPayload>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;

    let order = state
        .app
        .orders
        .update_tracking(order.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    #[tokio::test]
    async fn test_update_tracking_forwards_fields() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_tracking()
            .once()
            .withf(move |order, tracking| {
                order.into_uuid() == uuid
                    && tracking.tracking_number.as_deref() == Some("TRK123")
                    && tracking.tracking_link.is_none()
            })
            .return_once(move |_, _| Ok(make_order(uuid)));

        let service = orders_service(
            orders,
            Router::with_path("orders/{order}/tracking").put(handler),
        );

        let res = TestClient::put(format!("http://example.com/orders/{uuid}/tracking"))
            .json(&json!({ "tracking_number": "TRK123", "courier_name": "Delhivery" }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
