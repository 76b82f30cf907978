//! App Router

use salvo::Router;

use crate::{carts, checkout, healthcheck, observability, orders};

/// Every storefront route, without middleware.
pub fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("checkout")
                .push(Router::with_path("quote").post(checkout::quote::handler))
                .push(Router::with_path("intent").post(checkout::intent::handler))
                .push(Router::with_path("verify").post(checkout::verify::handler))
                .push(Router::with_path("cod").post(checkout::cod::handler)),
        )
        .push(
            Router::with_path("carts/{key}")
                .get(carts::get::handler)
                .push(Router::with_path("merge").post(carts::merge::handler))
                .push(
                    Router::with_path("lines")
                        .post(carts::lines::create::handler)
                        .push(
                            Router::with_path("{line}")
                                .put(carts::lines::update::handler)
                                .delete(carts::lines::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("coupons")
                        .post(carts::coupons::create::handler)
                        .push(Router::with_path("{code}").delete(carts::coupons::delete::handler)),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .push(Router::with_path("leaderboard").get(orders::leaderboard::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .delete(orders::delete::handler)
                        .push(Router::with_path("status").put(orders::status::handler))
                        .push(Router::with_path("tracking").put(orders::tracking::handler))
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(
                            Router::with_path("shipment")
                                .get(orders::shipment::get::handler)
                                .post(orders::shipment::create::handler)
                                .delete(orders::shipment::delete::handler),
                        ),
                ),
        )
}
