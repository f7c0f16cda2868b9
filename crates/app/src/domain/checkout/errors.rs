//! Checkout errors.

use thiserror::Error;

use crate::{
    domain::products::records::ProductUuid,
    store::{Retryable, StoreError},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("invalid checkout request: {0}")]
    InvalidRequest(&'static str),

    #[error("only customers can check out")]
    Forbidden,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product {product_uuid} is no longer available")]
    ProductMissing { product_uuid: ProductUuid },

    #[error("only {available} of {name} in stock, {requested} requested")]
    InsufficientStock {
        product_uuid: ProductUuid,
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("checkout could not be completed due to concurrent activity, try again")]
    TransientStoreConflict,

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for CheckoutError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => Self::TransientStoreConflict,
            StoreError::NotFound | StoreError::Constraint | StoreError::Sql(_) => {
                Self::Storage(error)
            }
        }
    }
}

impl Retryable for CheckoutError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreConflict)
    }
}
