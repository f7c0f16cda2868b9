//! Orders service errors.

use thiserror::Error;

use crate::{
    domain::orders::records::OrderStatus,
    store::{Retryable, StoreError},
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("not permitted to act on this order")]
    Forbidden,

    #[error("status {0} cannot be requested")]
    InvalidStatus(OrderStatus),

    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("order is being modified concurrently, try again")]
    TransientStoreConflict,

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => Self::TransientStoreConflict,
            StoreError::NotFound => Self::NotFound,
            StoreError::Constraint | StoreError::Sql(_) => Self::Storage(error),
        }
    }
}

impl Retryable for OrdersServiceError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreConflict)
    }
}
