//! Storefront JSON API Healthcheck Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extensions::*;

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when a dependency is unreachable
    pub status: String,

    /// `ok` or `unavailable`
    pub database: String,
}

impl HealthResponse {
    fn new(database_ok: bool) -> Self {
        let (status, database) = if database_ok {
            ("ok", "ok")
        } else {
            ("degraded", "unavailable")
        };

        Self {
            status: status.to_string(),
            database: database.to_string(),
        }
    }
}

/// Healthcheck handler
///
/// Reports whether the server can reach its database. Responds 503 when it
/// cannot, so load balancers stop routing checkouts here.
#[endpoint(
    tags("health"),
    summary = "Health check endpoint",
    responses(
        (status_code = StatusCode::OK, description = "Server and database reachable"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Database unreachable"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<HealthResponse>, StatusError> {
    let state = depot.state()?;

    let database_ok = match state.app.database.ping().await {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "database ping failed");
            false
        }
    };

    if !database_ok {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse::new(database_ok)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::database::MockDatabaseHealth;

    use crate::test_helpers::health_service;

    use super::*;

    fn make_service(database: MockDatabaseHealth) -> Service {
        health_service(database, Router::with_path("healthcheck").get(handler))
    }

    #[tokio::test]
    async fn test_healthcheck_reports_reachable_database() -> TestResult {
        let mut database = MockDatabaseHealth::new();

        database.expect_ping().once().return_once(|| Ok(()));

        let mut res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service(database))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: HealthResponse = res.take_json().await?;

        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");

        Ok(())
    }

    #[tokio::test]
    async fn test_healthcheck_is_unavailable_without_database() -> TestResult {
        let mut database = MockDatabaseHealth::new();

        database
            .expect_ping()
            .once()
            .return_once(|| Err(sqlx::Error::PoolClosed));

        let mut res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service(database))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        let body: HealthResponse = res.take_json().await?;

        assert_eq!(body.status, "degraded");
        assert_eq!(body.database, "unavailable");

        Ok(())
    }
}
