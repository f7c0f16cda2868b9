//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::orders::OrdersServiceError;

use crate::retry_hint::transient_conflict;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::Forbidden => {
            StatusError::forbidden().brief("Not permitted to act on this order")
        }
        OrdersServiceError::InvalidStatus(_) => StatusError::bad_request().brief(error.to_string()),
        OrdersServiceError::IllegalTransition { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::TransientStoreConflict => transient_conflict("Order"),
        OrdersServiceError::Storage(source) => {
            error!("order storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
