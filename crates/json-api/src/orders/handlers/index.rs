//! List Orders Handler

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// List Orders Handler
///
/// Lists a buyer's orders, newest first. Pass `account` for a registered
/// buyer or `email` to look up guest orders by shipping email.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    account: QueryParam<Uuid, false>,
    email: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.state()?;
    let email = email.into_inner().filter(|email| !email.trim().is_empty());

    let orders = match (account.into_inner(), email) {
        (Some(account), None) => state.app.orders.list_for_buyer(account.into()).await,
        (None, Some(email)) => state.app.orders.list_for_email(email.trim()).await,
        (Some(_), Some(_)) | (None, None) => {
            return Err(
                StatusError::bad_request().brief("Provide exactly one of account or email")
            );
        }
    }
    .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders").get(handler))
    }

    #[tokio::test]
    async fn test_list_by_account() -> TestResult {
        let account = Uuid::now_v7();
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_for_buyer()
            .once()
            .withf(move |buyer| buyer.into_uuid() == account)
            .return_once(|_| Ok(vec![make_order(Uuid::now_v7()), make_order(Uuid::now_v7())]));

        orders.expect_list_for_email().never();

        let mut res = TestClient::get(format!("http://example.com/orders?account={account}"))
            .send(&make_service(orders))
            .await;

        let body: Vec<OrderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_by_email() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_for_email()
            .once()
            .withf(|email| email == "asha@example.com")
            .return_once(|_| Ok(Vec::new()));

        orders.expect_list_for_buyer().never();

        let res = TestClient::get("http://example.com/orders?email=asha@example.com")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_without_filter_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_list_for_buyer().never();
        orders.expect_list_for_email().never();

        let res = TestClient::get("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
