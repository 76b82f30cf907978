//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

use storefront_app::domain::orders::models::PaymentMethod;

#[derive(Debug)]
struct StorefrontMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    checkout_outcomes_total: IntCounterVec,
    orders_placed_total: IntCounterVec,
}

static METRICS: OnceLock<Option<StorefrontMetrics>> = OnceLock::new();

/// How a checkout call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckoutOutcome {
    /// A new order was committed.
    Placed,

    /// The order already existed for the payment.
    Replayed,

    /// The gateway has not settled the payment.
    PaymentNotCompleted,

    /// The request was refused before anything was committed.
    Rejected,

    /// An upstream or storage failure.
    Failed,
}

impl CheckoutOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Replayed => "replayed",
            Self::PaymentNotCompleted => "payment_not_completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a checkout outcome, and the order it placed when there is one.
pub(crate) fn record_checkout(
    operation: &str,
    outcome: CheckoutOutcome,
    payment_method: Option<PaymentMethod>,
) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics
        .checkout_outcomes_total
        .with_label_values(&[operation, outcome.as_str()])
        .inc();

    if outcome == CheckoutOutcome::Placed
        && let Some(payment_method) = payment_method
    {
        metrics
            .orders_placed_total
            .with_label_values(&[payment_method.as_str()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static StorefrontMetrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn register<M>(registry: &Registry, name: &str, metric: prometheus::Result<M>) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    let metric = match metric {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create {name} metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(metric.clone())) {
        error!("failed to register {name} metric: {source}");
        return None;
    }

    Some(metric)
}

fn build_metrics() -> Option<StorefrontMetrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        "requests_total",
        IntCounterVec::new(
            Opts::new(
                "storefront_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "request_duration",
        HistogramVec::new(
            HistogramOpts::new(
                "storefront_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "in-flight gauge",
        IntGauge::with_opts(Opts::new(
            "storefront_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        )),
    )?;

    let checkout_outcomes_total = register(
        &registry,
        "checkout_outcomes",
        IntCounterVec::new(
            Opts::new(
                "storefront_json_checkout_outcomes_total",
                "Checkout calls partitioned by operation and outcome.",
            ),
            &["operation", "outcome"],
        ),
    )?;

    let orders_placed_total = register(
        &registry,
        "orders_placed",
        IntCounterVec::new(
            Opts::new(
                "storefront_json_orders_placed_total",
                "Orders committed through checkout partitioned by payment method.",
            ),
            &["payment_method"],
        ),
    )?;

    Some(StorefrontMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        checkout_outcomes_total,
        orders_placed_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_and_checkout_metrics() -> TestResult {
        observe_request("POST", "/checkout/verify", 200, 0.042);
        observe_request("GET", "/orders/{uuid}", 404, 0.003);
        record_checkout(
            "verify",
            CheckoutOutcome::Placed,
            Some(PaymentMethod::Gateway),
        );
        record_checkout("cod", CheckoutOutcome::Rejected, None);

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let response = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        assert!(
            response.contains("storefront_json_http_requests_total"),
            "expected requests_total metric in response"
        );
        assert!(
            response.contains("storefront_json_http_request_duration_seconds"),
            "expected request_duration metric in response"
        );
        assert!(
            response.contains("storefront_json_checkout_outcomes_total"),
            "expected checkout outcome metric in response"
        );
        assert!(
            response.contains("payment_method=\"gateway\""),
            "expected orders placed by payment method in response"
        );

        Ok(())
    }

    #[test]
    fn status_class_buckets_codes() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(502), "5xx");
        assert_eq!(status_class(42), "other");
    }
}
