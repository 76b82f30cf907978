//! Quote Handler

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    checkout::{
        errors::into_status_error,
        models::{CartKeyRequest, QuoteResponse},
    },
    extensions::*,
};

/// Quote Handler
///
/// Prices the server-side cart: subtotal, delivery charge, coupon discounts
/// and the amount due.
#[endpoint(
    tags("checkout"),
    summary = "Quote Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart priced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CartKeyRequest>,
    depot: &mut Depot,
) -> Result<Json<QuoteResponse>, StatusError> {
    let state = depot.state()?;

    let quote = state
        .app
        .checkout
        .quote(&json.into_inner().cart_key)
        .await
        .map_err(into_status_error)?;

    Ok(Json(quote.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::checkout::{
        CheckoutError, MockCheckoutService, models::Quote,
    };

    use crate::{
        errors::ErrorResponse,
        test_helpers::{checkout_service, make_cart},
    };

    use super::*;

    fn make_service(checkout: MockCheckoutService) -> Service {
        checkout_service(checkout, Router::with_path("checkout/quote").post(handler))
    }

    #[tokio::test]
    async fn test_quote_includes_delivery_charge() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_quote()
            .once()
            .withf(|key| key == "guest-1")
            .return_once(|_| {
                Ok(Quote {
                    lines: make_cart("guest-1").lines,
                    subtotal: 99_800,
                    shipping_cost: 5_000,
                    applied_coupons: Vec::new(),
                    discount_total: 0,
                    total_amount: 104_800,
                })
            });

        let mut res = TestClient::post("http://example.com/checkout/quote")
            .json(&json!({ "cart_key": "guest-1" }))
            .send(&make_service(checkout))
            .await;

        let body: QuoteResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success);
        assert_eq!(body.lines.len(), 1);
        assert_eq!(body.total_amount, 104_800);

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_empty_cart_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_quote()
            .once()
            .return_once(|_| Err(CheckoutError::EmptyCart));

        let mut res = TestClient::post("http://example.com/checkout/quote")
            .json(&json!({ "cart_key": "guest-1" }))
            .send(&make_service(checkout))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(!body.success);
        assert_eq!(body.message, "Cart is empty");

        Ok(())
    }
}
