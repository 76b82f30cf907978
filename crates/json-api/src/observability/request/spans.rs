//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace buyer-chosen path segments with their route parameter names so
/// span names and metric labels stay low-cardinality.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::new();
    let mut previous = "";

    for segment in path.trim_start_matches('/').split('/') {
        normalised.push('/');

        let placeholder = match previous {
            "carts" => Some("{key}"),
            "lines" => Some("{line}"),
            "coupons" => Some("{code}"),
            _ if Uuid::parse_str(segment).is_ok() => Some("{uuid}"),
            _ => None,
        };

        normalised.push_str(placeholder.unwrap_or(segment));
        previous = segment;
    }

    normalised
}
