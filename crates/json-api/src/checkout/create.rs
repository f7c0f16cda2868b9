//! Checkout Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use bazaar_app::domain::checkout::data::CheckoutRequest;

use crate::{
    checkout::errors::{into_status_error, outcome},
    extensions::*,
    observability::{CheckoutOutcome, observe_checkout},
    orders::models::OrderResponse,
    state::State,
};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutPayload {
    /// Opaque payment method descriptor
    #[serde(default)]
    pub payment_method: String,

    /// Delivery address
    #[serde(default)]
    pub shipping_address: String,
}

impl From<CheckoutPayload> for CheckoutRequest {
    fn from(payload: CheckoutPayload) -> Self {
        CheckoutRequest {
            payment_method: payload.payment_method,
            shipping_address: payload.shipping_address,
        }
    }
}

/// Checkout Handler
///
/// Converts the caller's cart into a pending order.
#[endpoint(
    tags("checkout"),
    summary = "Check Out Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid request, empty cart, or stock problem"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a customer"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Concurrent checkout, retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.create",
    skip(json, depot, res),
    fields(order_uuid = tracing::field::Empty, total = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutPayload>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let order = match state.checkout.checkout(caller, json.into_inner().into()).await {
        Ok(order) => order,
        Err(error) => {
            observe_checkout(outcome(&error));

            return Err(into_status_error(error));
        }
    };

    observe_checkout(CheckoutOutcome::Placed);

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order.uuid));
    span.record("total", order.total);

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
