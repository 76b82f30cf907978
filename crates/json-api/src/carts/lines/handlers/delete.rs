//! Remove Cart Line Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Remove Cart Line Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Line",
    responses(
        (status_code = StatusCode::OK, description = "Line removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart line not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    key: PathParam<String>,
    line: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;

    let cart = state
        .app
        .carts
        .remove_line(&key.into_inner(), line.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use storefront_app::domain::carts::{CartsServiceError, MockCartsService, models::Cart};

    use crate::test_helpers::carts_service;

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(
            carts,
            Router::with_path("carts/{key}/lines/{line}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_remove_line_success() -> TestResult {
        let line = Uuid::now_v7();
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_line()
            .once()
            .withf(move |key, uuid| key == "guest_abc" && uuid.into_uuid() == line)
            .return_once(|key, _| Ok(Cart::empty(key)));

        let res = TestClient::delete(format!("http://example.com/carts/guest_abc/lines/{line}"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_missing_line_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_line()
            .once()
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::delete(format!(
            "http://example.com/carts/guest_abc/lines/{}",
            Uuid::now_v7()
        ))
        .send(&make_service(carts))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
