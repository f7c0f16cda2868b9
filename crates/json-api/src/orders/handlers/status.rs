//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::orders::records::OrderStatus;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// Next status: `accepted` or `shipped`
    pub status: String,
}

/// Update Order Status Handler
///
/// Sellers move an order one step forward.
#[endpoint(
    tags("orders"),
    summary = "Advance Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status advanced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown or disallowed status"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller does not sell into this order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed from the current status"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.status",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty, target = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let order = order.into_inner();

    let target: OrderStatus = json
        .into_inner()
        .status
        .parse()
        .map_err(|_unknown| StatusError::bad_request().brief("Unknown order status"))?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("target", target.as_str());

    let updated = state
        .orders
        .advance_status(caller, order.into(), target)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::{
        auth::Caller,
        domain::orders::{MockOrdersService, OrdersServiceError},
    };

    use crate::test_helpers::{TEST_SELLER, customer, make_order, orders_service, seller};

    use super::*;

    fn make_service(orders: MockOrdersService, caller: Caller) -> Service {
        orders_service(
            orders,
            caller,
            Router::with_path("orders/{order}/status").put(handler),
        )
    }

    #[tokio::test]
    async fn seller_accepts_order() -> TestResult {
        let mut order = make_order();
        let uuid = order.uuid;

        order.status = OrderStatus::Accepted;

        let mut orders = MockOrdersService::new();

        orders
            .expect_advance_status()
            .once()
            .withf(move |caller, requested, target| {
                caller.uid.as_str() == TEST_SELLER
                    && *requested == uuid
                    && *target == OrderStatus::Accepted
            })
            .return_once(move |_, _, _| Ok(order));

        let mut res = TestClient::put(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "Accepted" }))
            .send(&make_service(orders, seller()))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "accepted");

        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_returns_400_without_calling_service() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_advance_status().never();

        let res = TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "cancelled" }))
            .send(&make_service(orders, seller()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn pending_target_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_advance_status()
            .once()
            .return_once(|_, _, target| Err(OrdersServiceError::InvalidStatus(target)));

        let res = TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "pending" }))
            .send(&make_service(orders, seller()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn skipping_a_step_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_advance_status().once().return_once(|_, _, _| {
            Err(OrdersServiceError::IllegalTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        });

        let res = TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "shipped" }))
            .send(&make_service(orders, seller()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn customer_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_advance_status()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::Forbidden));

        let res = TestClient::put(format!("http://example.com/orders/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "accepted" }))
            .send(&make_service(orders, customer()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
