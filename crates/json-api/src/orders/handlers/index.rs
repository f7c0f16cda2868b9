//! List Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderListResponse},
    state::State,
};

/// List Orders Handler
///
/// Customers see the orders they placed; sellers see orders containing their products.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders, newest first"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrderListResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let orders = state
        .orders
        .list_orders(caller)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{TEST_SELLER, make_order, orders_service, seller};

    use super::*;

    #[tokio::test]
    async fn seller_listing_returns_orders_in_service_order() -> TestResult {
        let newer = make_order();
        let older = make_order();
        let expected = [newer.uuid.into_uuid(), older.uuid.into_uuid()];

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|caller| caller.uid.as_str() == TEST_SELLER)
            .return_once(move |_| Ok(vec![newer, older]));

        let mut res = TestClient::get("http://example.com/orders")
            .send(&orders_service(
                orders,
                seller(),
                Router::with_path("orders").get(handler),
            ))
            .await;

        let body: OrderListResponse = res.take_json().await?;
        let uuids: Vec<_> = body.orders.iter().map(|order| order.uuid).collect();

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(uuids, expected);

        Ok(())
    }

    #[tokio::test]
    async fn empty_listing_is_200() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let mut res = TestClient::get("http://example.com/orders")
            .send(&orders_service(
                orders,
                seller(),
                Router::with_path("orders").get(handler),
            ))
            .await;

        let body: OrderListResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.orders.is_empty());

        Ok(())
    }
}
