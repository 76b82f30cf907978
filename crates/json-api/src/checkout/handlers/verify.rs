//! Verify Payment Handler

use salvo::{oapi::extract::JsonBody, prelude::*};

use storefront_app::domain::{checkout::CheckoutError, orders::models::PaymentMethod};

use crate::{
    checkout::{
        errors::into_status_error,
        models::{CheckoutResponse, VerifyPaymentRequest},
    },
    extensions::*,
    observability::{CheckoutOutcome, record_checkout},
};

use super::record_failure;

const OPERATION: &str = "verify";

/// Verify Payment Handler
///
/// Confirms with the gateway that the intent settled, then commits and
/// fulfills the order. Repeating the call for a verified intent returns the
/// existing order. An unsettled payment is reported with `success: false`.
#[endpoint(
    tags("checkout"),
    summary = "Verify Payment",
    responses(
        (status_code = StatusCode::OK, description = "Order placed, replayed, or payment not completed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Proof mismatch or incomplete address"),
        (status_code = StatusCode::NOT_FOUND, description = "Checkout intent not found"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.verify",
    skip(json, depot),
    fields(intent_id = tracing::field::Empty, request_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<VerifyPaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.state()?;
    let (intent_id, proof, request) = json.into_inner().into_parts();
    let span = tracing::Span::current();

    span.record("intent_id", intent_id.as_str());

    if let Some(request_id) = depot.request_id() {
        span.record("request_id", request_id);
    }

    match state.app.checkout.verify(&intent_id, proof, request).await {
        Ok(placed) => {
            let outcome = if placed.replayed {
                CheckoutOutcome::Replayed
            } else {
                CheckoutOutcome::Placed
            };

            record_checkout(OPERATION, outcome, Some(placed.order.payment_method));

            if let Some(report) = placed.fulfillment.as_ref().filter(|r| !r.is_complete()) {
                tracing::warn!(
                    order_number = %placed.order.order_number,
                    failures = ?report.failures,
                    "order placed with incomplete fulfillment"
                );
            }

            tracing::info!(
                order_number = %placed.order.order_number,
                replayed = placed.replayed,
                "verified payment"
            );

            let message = if placed.replayed {
                "Order already placed for this payment"
            } else {
                "Payment successful! Order placed."
            };

            Ok(Json(CheckoutResponse::placed(placed, message)))
        }
        Err(CheckoutError::PaymentNotCompleted(status)) => {
            record_checkout(
                OPERATION,
                CheckoutOutcome::PaymentNotCompleted,
                Some(PaymentMethod::Gateway),
            );

            tracing::warn!(?status, "payment not completed");

            Ok(Json(CheckoutResponse::not_completed("Payment not completed")))
        }
        Err(error) => Err(record_failure(
            OPERATION,
            PaymentMethod::Gateway,
            into_status_error(error),
        )),
    }
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;
    use uuid::Uuid;

    use storefront_app::{
        domain::{
            checkout::{MockCheckoutService, models::PlacedOrder},
            fulfillment::FulfillmentReport,
            identity::models::ResolvedBuyer,
        },
        gateways::payments::IntentStatus,
    };

    use crate::{
        errors::ErrorResponse,
        test_helpers::{checkout_service, make_order, shipping_address_json},
    };

    use super::*;

    fn make_service(checkout: MockCheckoutService) -> Service {
        checkout_service(checkout, Router::with_path("checkout/verify").post(handler))
    }

    fn verify_body() -> Value {
        json!({
            "intent_id": "order_abc",
            "gateway_order_id": "order_abc",
            "gateway_payment_id": "pay_123",
            "gateway_signature": "sig",
            "shipping_address": shipping_address_json(),
        })
    }

    #[tokio::test]
    async fn test_verify_places_new_order() -> TestResult {
        let order_uuid = Uuid::now_v7();
        let account = Uuid::now_v7();
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_verify()
            .once()
            .withf(|intent_id, proof, request| {
                intent_id == "order_abc"
                    && proof.gateway_payment_id == "pay_123"
                    && proof.gateway_signature.as_deref() == Some("sig")
                    && request.buyer_token.is_none()
                    && request.shipping_address.city == "Pune"
            })
            .return_once(move |_, _, _| {
                Ok(PlacedOrder {
                    order: make_order(order_uuid),
                    buyer: ResolvedBuyer {
                        account: account.into(),
                        is_new_account: true,
                        session_token: Some("session".to_string()),
                    },
                    fulfillment: Some(FulfillmentReport {
                        products_unlocked: 1,
                        cart_cleared: true,
                        ..FulfillmentReport::default()
                    }),
                    replayed: false,
                })
            });

        let mut res = TestClient::post("http://example.com/checkout/verify")
            .json(&verify_body())
            .send(&make_service(checkout))
            .await;

        let body: CheckoutResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success);
        assert!(body.is_new_account);
        assert!(!body.replayed);
        assert_eq!(body.account, Some(account));
        assert_eq!(body.session_token.as_deref(), Some("session"));
        assert_eq!(
            body.order.map(|order| order.order_number),
            Some("ORD-2026-0001".to_string())
        );
        assert_eq!(body.fulfillment.map(|f| f.products_unlocked), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_replay_returns_existing_order() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_verify()
            .once()
            .return_once(|_, _, _| Ok(PlacedOrder::replayed(make_order(Uuid::now_v7()))));

        let mut res = TestClient::post("http://example.com/checkout/verify")
            .json(&verify_body())
            .send(&make_service(checkout))
            .await;

        let body: CheckoutResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success);
        assert!(body.replayed);
        assert!(body.fulfillment.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_payment_is_not_an_error_status() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_verify()
            .once()
            .return_once(|_, _, _| Err(CheckoutError::PaymentNotCompleted(IntentStatus::Pending)));

        let mut res = TestClient::post("http://example.com/checkout/verify")
            .json(&verify_body())
            .send(&make_service(checkout))
            .await;

        let body: CheckoutResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(!body.success);
        assert_eq!(body.message, "Payment not completed");
        assert!(body.order.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_mismatched_proof_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_verify()
            .once()
            .return_once(|_, _, _| Err(CheckoutError::ProofMismatch));

        let mut res = TestClient::post("http://example.com/checkout/verify")
            .json(&verify_body())
            .send(&make_service(checkout))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            body.message,
            "Payment proof does not match the checkout intent"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_address_is_rejected_before_the_service() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_verify().never();

        let res = TestClient::post("http://example.com/checkout/verify")
            .json(&json!({
                "intent_id": "order_abc",
                "gateway_order_id": "order_abc",
                "gateway_payment_id": "pay_123",
            }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
