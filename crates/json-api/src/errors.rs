//! JSON error bodies.

use salvo::{catcher::Catcher, http::ResBody, oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

/// Body of every failed response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// Human-readable reason
    pub message: String,
}

impl ErrorResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Rewrite error responses as `{success: false, message}`.
#[handler]
pub(crate) async fn json_errors(res: &mut Response, ctrl: &mut FlowCtrl) {
    let Some(status) = res.status_code else {
        return;
    };

    if !(status.is_client_error() || status.is_server_error()) {
        return;
    }

    let brief = match res.take_body() {
        ResBody::Error(error) => error.brief,
        _ => String::new(),
    };

    let message = if brief.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_owned()
    } else {
        brief
    };

    res.render(Json(ErrorResponse::new(message)));
    ctrl.skip_rest();
}

/// Catcher installing [`json_errors`].
pub(crate) fn catcher() -> Catcher {
    Catcher::default().hoop(json_errors)
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn conflict() -> Result<&'static str, StatusError> {
        Err(StatusError::conflict().brief("Coupon already applied"))
    }

    #[tokio::test]
    async fn status_errors_render_as_json() -> TestResult {
        let service =
            Service::new(Router::with_path("conflict").get(conflict)).catcher(catcher());

        let mut res = TestClient::get("http://example.com/conflict")
            .send(&service)
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert!(!body.success, "error bodies are never successful");
        assert_eq!(body.message, "Coupon already applied");

        Ok(())
    }

    #[tokio::test]
    async fn unmatched_routes_render_as_json() -> TestResult {
        let service = Service::new(Router::with_path("conflict").get(conflict)).catcher(catcher());

        let mut res = TestClient::get("http://example.com/missing")
            .send(&service)
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert!(!body.message.is_empty(), "expected a message");

        Ok(())
    }
}
