//! Leaderboard Handler

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::LeaderboardEntryResponse},
};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Leaderboard Handler
///
/// Buyers ranked by points earned from delivered and in-flight orders.
#[endpoint(
    tags("orders"),
    summary = "Buyer Leaderboard",
    responses(
        (status_code = StatusCode::OK, description = "Ranked buyers"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    limit: QueryParam<usize, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<LeaderboardEntryResponse>>, StatusError> {
    let state = depot.state()?;

    let limit = limit.into_inner().unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = state
        .app
        .orders
        .leaderboard(limit)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| LeaderboardEntryResponse::ranked(index + 1, entry))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use uuid::Uuid;

    use storefront_app::domain::orders::{MockOrdersService, models::LeaderboardEntry};

    use crate::test_helpers::orders_service;

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/leaderboard").get(handler))
    }

    fn entry(username: &str, points: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            account: Uuid::now_v7().into(),
            username: username.to_string(),
            points,
            orders: 1,
        }
    }

    #[tokio::test]
    async fn test_leaderboard_is_ranked_from_one() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_leaderboard()
            .once()
            .withf(|limit| *limit == DEFAULT_LIMIT)
            .return_once(|_| Ok(vec![entry("asha", 20), entry("ravi", 10)]));

        let mut res = TestClient::get("http://example.com/orders/leaderboard")
            .send(&make_service(orders))
            .await;

        let body: Vec<LeaderboardEntryResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.iter()
                .map(|entry| (entry.rank, entry.username.as_str()))
                .collect::<Vec<_>>(),
            vec![(1, "asha"), (2, "ravi")]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_limit_is_capped() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_leaderboard()
            .once()
            .withf(|limit| *limit == MAX_LIMIT)
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/orders/leaderboard?limit=5000")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
