//! Carts service errors.

use thiserror::Error;

use crate::{
    domain::carts::data::MAX_QUANTITY,
    store::{Retryable, StoreError},
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("quantity must be between 1 and {max}", max = MAX_QUANTITY)]
    InvalidQuantity,

    #[error("product not found")]
    ProductNotFound,

    #[error("cart entry not found")]
    NotFound,

    #[error("carts are only available to customers")]
    Forbidden,

    #[error("cart is being modified concurrently, try again")]
    TransientStoreConflict,

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => Self::TransientStoreConflict,
            StoreError::NotFound => Self::NotFound,
            StoreError::Constraint | StoreError::Sql(_) => Self::Storage(error),
        }
    }
}

impl Retryable for CartsServiceError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreConflict)
    }
}
