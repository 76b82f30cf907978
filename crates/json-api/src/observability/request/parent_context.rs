//! W3C trace-context extraction from HTTP headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

/// The caller's span context, when the request carries a valid `traceparent`.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| extract_with(propagator, headers))
}

fn extract_with(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    // Start from an empty context so the current in-process span is never inherited.
    let context = propagator.extract_with_context(&Context::new(), &HeaderExtractor(headers));
    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

#[derive(Debug)]
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::header::HeaderValue;

    use super::*;

    #[test]
    fn valid_traceparent_yields_parent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let context = extract_with(&TraceContextPropagator::new(), &headers);

        assert!(context.is_some(), "expected a parent context");
    }

    #[test]
    fn missing_traceparent_yields_none() {
        let context = extract_with(&TraceContextPropagator::new(), &HeaderMap::new());

        assert!(context.is_none(), "expected no parent context");
    }
}
