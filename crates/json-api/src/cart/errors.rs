//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::carts::CartsServiceError;

use crate::retry_hint::transient_conflict;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart entry not found"),
        CartsServiceError::Forbidden => {
            StatusError::forbidden().brief("Carts are only available to customers")
        }
        CartsServiceError::TransientStoreConflict => transient_conflict("Cart"),
        CartsServiceError::Storage(source) => {
            error!("cart storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
