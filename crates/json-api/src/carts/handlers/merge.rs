//! Merge Cart Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Merge Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeCartRequest {
    /// Key of the guest cart to fold into this one
    pub guest_key: String,
}

/// Merge Cart Handler
///
/// Moves a guest cart's lines into the cart at `key`, adding quantities for
/// matching lines.
#[endpoint(
    tags("carts"),
    summary = "Merge Guest Cart",
    responses(
        (status_code = StatusCode::OK, description = "Merged cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "carts.merge", skip(key, json, depot), err)]
pub(crate) async fn handler(
    key: PathParam<String>,
    json: JsonBody<MergeCartRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let key = key.into_inner();
    let guest_key = json.into_inner().guest_key;

    if guest_key.trim().is_empty() || guest_key == key {
        return Err(StatusError::bad_request().brief("guest_key must name a different cart"));
    }

    let cart = state
        .app
        .carts
        .merge(&guest_key, &key)
        .await
        .map_err(into_status_error)?;

    tracing::info!(from = %guest_key, into = %key, lines = cart.lines.len(), "merged cart");

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::carts::MockCartsService;

    use crate::test_helpers::{carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("carts/{key}/merge").post(handler))
    }

    #[tokio::test]
    async fn test_merge_moves_guest_cart_into_account_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_merge()
            .once()
            .withf(|from, into| from == "guest_abc" && into == "acct_1")
            .return_once(|_, into| Ok(make_cart(into)));

        let res = TestClient::post("http://example.com/carts/acct_1/merge")
            .json(&json!({ "guest_key": "guest_abc" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_into_itself_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_merge().never();

        let res = TestClient::post("http://example.com/carts/acct_1/merge")
            .json(&json!({ "guest_key": "acct_1" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
