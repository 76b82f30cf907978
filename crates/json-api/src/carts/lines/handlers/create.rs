//! Add Cart Line Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::carts::models::{LineItem, NewCartLine, Variant};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, CustomDesignPayload, LineType},
    },
    extensions::*,
};

/// Add Cart Line Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartLineRequest {
    /// What the line refers to
    pub line_type: LineType,

    /// Product or collection UUID
    pub reference: Uuid,

    /// Number of units
    #[serde(default = "one")]
    pub quantity: u32,

    /// Selected brand
    #[serde(default)]
    pub brand: Option<String>,

    /// Selected model
    #[serde(default)]
    pub model: Option<String>,

    /// Required for `custom_design` lines
    #[serde(default)]
    pub custom_design: Option<CustomDesignPayload>,
}

fn one() -> u32 {
    1
}

impl TryFrom<AddCartLineRequest> for NewCartLine {
    type Error = StatusError;

    fn try_from(request: AddCartLineRequest) -> Result<Self, Self::Error> {
        let product = request.reference.into();

        let item = match request.line_type {
            LineType::Item => LineItem::Item { product },
            LineType::SuggestedItem => LineItem::SuggestedItem { product },
            LineType::Collection => LineItem::Collection {
                collection: request.reference.into(),
            },
            LineType::CustomDesign => {
                let design = request.custom_design.ok_or_else(|| {
                    StatusError::bad_request().brief("custom_design is required for custom lines")
                })?;

                LineItem::CustomDesign {
                    product,
                    design: design.into(),
                }
            }
        };

        Ok(NewCartLine {
            item,
            quantity: request.quantity,
            variant: Variant {
                brand: request.brand,
                model: request.model,
            },
        })
    }
}

/// Add Cart Line Handler
///
/// Prices the line from the catalog and merges it into a matching line.
#[endpoint(
    tags("carts"),
    summary = "Add Line to Cart",
    responses(
        (status_code = StatusCode::CREATED, description = "Line added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product or collection not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.lines.create",
    skip(key, json, depot, res),
    fields(cart_key = tracing::field::Empty, reference = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    key: PathParam<String>,
    json: JsonBody<AddCartLineRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let key = key.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("cart_key", tracing::field::display(&key));
    span.record("reference", tracing::field::display(request.reference));

    let line = NewCartLine::try_from(request)?;

    let cart = state
        .app
        .carts
        .add_line(&key, line)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::carts::{CartsServiceError, MockCartsService};

    use crate::test_helpers::{carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("carts/{key}/lines").post(handler))
    }

    #[tokio::test]
    async fn test_add_line_returns_201() -> TestResult {
        let reference = Uuid::now_v7();
        let mut carts = MockCartsService::new();

        carts
            .expect_add_line()
            .once()
            .withf(move |key, line| {
                key == "guest_abc"
                    && line.quantity == 2
                    && line.item.reference() == reference
                    && line.variant.model.as_deref() == Some("iPhone 15")
            })
            .return_once(|key, _| Ok(make_cart(key)));

        let mut res = TestClient::post("http://example.com/carts/guest_abc/lines")
            .json(&json!({
                "line_type": "item",
                "reference": reference,
                "quantity": 2,
                "brand": "Apple",
                "model": "iPhone 15",
            }))
            .send(&make_service(carts))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.key, "guest_abc");

        Ok(())
    }

    #[tokio::test]
    async fn test_custom_line_without_design_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_line().never();

        let res = TestClient::post("http://example.com/carts/guest_abc/lines")
            .json(&json!({ "line_type": "custom_design", "reference": Uuid::now_v7() }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_line()
            .once()
            .return_once(|_, _| Err(CartsServiceError::InsufficientStock));

        let res = TestClient::post("http://example.com/carts/guest_abc/lines")
            .json(&json!({ "line_type": "item", "reference": Uuid::now_v7(), "quantity": 9 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_reference_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_line()
            .once()
            .return_once(|_, _| Err(CartsServiceError::ReferenceNotFound));

        let res = TestClient::post("http://example.com/carts/guest_abc/lines")
            .json(&json!({ "line_type": "collection", "reference": Uuid::now_v7() }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
