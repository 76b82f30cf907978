//! Remove Coupon Handler

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Remove Coupon Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    key: PathParam<String>,
    code: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;

    let cart = state
        .app
        .carts
        .remove_coupon(&key.into_inner(), &code.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::carts::MockCartsService;

    use crate::test_helpers::{carts_service, make_cart};

    use super::*;

    #[tokio::test]
    async fn test_remove_coupon_returns_cart_without_it() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_coupon()
            .once()
            .withf(|key, code| key == "guest_abc" && code == "SAVE10")
            .return_once(|key, _| Ok(make_cart(key)));

        let service = carts_service(
            carts,
            Router::with_path("carts/{key}/coupons/{code}").delete(handler),
        );

        let mut res = TestClient::delete("http://example.com/carts/guest_abc/coupons/SAVE10")
            .send(&service)
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.coupons.is_empty(), "expected no coupons");

        Ok(())
    }
}
