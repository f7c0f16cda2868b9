//! Checkout Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::checkout::CheckoutError;

use crate::{observability::CheckoutOutcome, retry_hint::transient_conflict};

pub(crate) fn outcome(error: &CheckoutError) -> CheckoutOutcome {
    match error {
        CheckoutError::InvalidRequest(_)
        | CheckoutError::Forbidden
        | CheckoutError::EmptyCart
        | CheckoutError::ProductMissing { .. } => CheckoutOutcome::Rejected,
        CheckoutError::InsufficientStock { .. } => CheckoutOutcome::OutOfStock,
        CheckoutError::TransientStoreConflict => CheckoutOutcome::Conflict,
        CheckoutError::Storage(_) => CheckoutOutcome::Failed,
    }
}

/// Validation failures echo the domain message so clients can show which
/// field or product was at fault.
pub(crate) fn into_status_error(error: CheckoutError) -> StatusError {
    match error {
        CheckoutError::InvalidRequest(_)
        | CheckoutError::ProductMissing { .. }
        | CheckoutError::InsufficientStock { .. } => {
            StatusError::bad_request().brief(error.to_string())
        }
        CheckoutError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutError::Forbidden => {
            StatusError::forbidden().brief("Only customers can check out")
        }
        CheckoutError::TransientStoreConflict => transient_conflict("Checkout"),
        CheckoutError::Storage(source) => {
            error!("checkout storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
