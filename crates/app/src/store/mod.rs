//! Transactional document store.
//!
//! Services receive a [`Store`] handle and run each unit of work inside a
//! single [`StoreTransaction`]. Dropping a transaction without committing
//! discards every buffered write.

use async_trait::async_trait;

use crate::{
    auth::UserId,
    domain::{
        carts::records::CartEntryRecord,
        orders::{
            data::NewOrder,
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        products::records::{ProductRecord, ProductUuid},
    },
};

mod errors;
mod memory;
mod postgres;
mod retry;

pub use errors::StoreError;
pub use memory::{MemoryStore, MemoryTransaction};
pub use postgres::{PgStore, PgTransaction};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy, Retryable, with_retries};

#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Transaction: StoreTransaction;

    /// Open a serializable transaction.
    async fn begin(&self) -> Result<Self::Transaction, StoreError>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    /// Read a product snapshot.
    async fn product(&mut self, product: ProductUuid)
    -> Result<Option<ProductRecord>, StoreError>;

    /// Add `delta` to a product's quantity on hand.
    ///
    /// Fails with [`StoreError::Constraint`] if the result would be negative.
    async fn apply_stock_delta(
        &mut self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<(), StoreError>;

    /// Read every entry of a customer's cart, ordered by product.
    async fn cart_entries(&mut self, customer: &UserId)
    -> Result<Vec<CartEntryRecord>, StoreError>;

    /// Create or replace the entry for `product` in a customer's cart.
    async fn put_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartEntryRecord, StoreError>;

    /// Remove one entry; returns whether it existed.
    async fn delete_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
    ) -> Result<bool, StoreError>;

    /// Remove every entry of a customer's cart; returns how many were removed.
    async fn clear_cart(&mut self, customer: &UserId) -> Result<u64, StoreError>;

    /// Insert a new `Pending` order stamped with the server clock.
    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord, StoreError>;

    async fn order(&mut self, order: OrderUuid) -> Result<Option<OrderRecord>, StoreError>;

    async fn set_order_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError>;

    /// Orders placed by `customer`, newest first.
    async fn orders_for_customer(
        &mut self,
        customer: &UserId,
    ) -> Result<Vec<OrderRecord>, StoreError>;

    /// Orders with at least one line item sold by `seller`, newest first.
    async fn orders_for_seller(&mut self, seller: &UserId)
    -> Result<Vec<OrderRecord>, StoreError>;

    /// Atomically apply every write, or fail with [`StoreError::Conflict`].
    async fn commit(self) -> Result<(), StoreError>;
}
