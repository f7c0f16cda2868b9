//! App Router

use salvo::Router;

use crate::{auth, cart, checkout, orders};

/// Authenticated routes for carts, checkout and orders.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("cart").get(cart::get::handler).push(
                Router::with_path("items").post(cart::add::handler).push(
                    Router::with_path("{product}")
                        .put(cart::update::handler)
                        .delete(cart::remove::handler),
                ),
            ),
        )
        .push(Router::with_path("checkout").post(checkout::create::handler))
        .push(
            Router::with_path("orders").get(orders::index::handler).push(
                Router::with_path("{order}")
                    .get(orders::get::handler)
                    .push(Router::with_path("status").put(orders::status::handler))
                    .push(Router::with_path("complete").put(orders::complete::handler)),
            ),
        )
}
