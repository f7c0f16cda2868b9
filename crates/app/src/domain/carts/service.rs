//! Carts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::{Caller, Resource, capability},
    domain::{
        carts::{
            data::{MAX_QUANTITY, NewCartItem},
            errors::CartsServiceError,
            records::CartEntryRecord,
        },
        products::records::ProductUuid,
    },
    store::{RetryPolicy, Store, StoreTransaction, with_retries},
};

#[derive(Debug, Clone)]
pub struct StoreCartsService<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: Store> StoreCartsService<S> {
    #[must_use]
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }
}

fn check_quantity(quantity: u32) -> Result<u32, CartsServiceError> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        Ok(quantity)
    } else {
        Err(CartsServiceError::InvalidQuantity)
    }
}

fn authorize(caller: &Caller) -> Result<(), CartsServiceError> {
    if capability(caller, Resource::Cart).is_allowed() {
        Ok(())
    } else {
        Err(CartsServiceError::Forbidden)
    }
}

#[async_trait]
impl<S: Store> CartsService for StoreCartsService<S> {
    #[tracing::instrument(
        name = "carts.service.get_cart",
        skip(self, caller),
        fields(customer = %caller.uid),
        err
    )]
    async fn get_cart(&self, caller: &Caller) -> Result<Vec<CartEntryRecord>, CartsServiceError> {
        authorize(caller)?;

        let mut tx = self.store.begin().await?;

        let entries = tx.cart_entries(&caller.uid).await?;

        tx.commit().await?;

        Ok(entries)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, caller, item),
        fields(customer = %caller.uid, product_uuid = %item.product_uuid),
        err
    )]
    async fn add_item(
        &self,
        caller: &Caller,
        item: NewCartItem,
    ) -> Result<CartEntryRecord, CartsServiceError> {
        authorize(caller)?;

        check_quantity(item.quantity)?;

        let customer = &caller.uid;

        with_retries(self.retry, "carts.add_item", move || async move {
            let mut tx = self.store.begin().await?;

            if tx.product(item.product_uuid).await?.is_none() {
                return Err(CartsServiceError::ProductNotFound);
            }

            let existing = tx
                .cart_entries(customer)
                .await?
                .into_iter()
                .find(|entry| entry.product_uuid == item.product_uuid)
                .map_or(0, |entry| entry.quantity);

            let quantity = existing
                .checked_add(item.quantity)
                .ok_or(CartsServiceError::InvalidQuantity)
                .and_then(check_quantity)?;

            let entry = tx
                .put_cart_entry(customer, item.product_uuid, quantity)
                .await?;

            tx.commit().await?;

            Ok(entry)
        })
        .await
    }

    #[tracing::instrument(
        name = "carts.service.set_quantity",
        skip(self, caller),
        fields(customer = %caller.uid, product_uuid = %product),
        err
    )]
    async fn set_quantity(
        &self,
        caller: &Caller,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartEntryRecord, CartsServiceError> {
        authorize(caller)?;

        check_quantity(quantity)?;

        let customer = &caller.uid;

        with_retries(self.retry, "carts.set_quantity", move || async move {
            let mut tx = self.store.begin().await?;

            let present = tx
                .cart_entries(customer)
                .await?
                .iter()
                .any(|entry| entry.product_uuid == product);

            if !present {
                return Err(CartsServiceError::NotFound);
            }

            let entry = tx.put_cart_entry(customer, product, quantity).await?;

            tx.commit().await?;

            Ok(entry)
        })
        .await
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self, caller),
        fields(customer = %caller.uid, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        caller: &Caller,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        authorize(caller)?;

        let customer = &caller.uid;

        with_retries(self.retry, "carts.remove_item", move || async move {
            let mut tx = self.store.begin().await?;

            if !tx.delete_cart_entry(customer, product).await? {
                return Err(CartsServiceError::NotFound);
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the caller's cart, ordered by product.
    async fn get_cart(&self, caller: &Caller) -> Result<Vec<CartEntryRecord>, CartsServiceError>;

    /// Add a product to the caller's cart, merging with an existing entry.
    async fn add_item(
        &self,
        caller: &Caller,
        item: NewCartItem,
    ) -> Result<CartEntryRecord, CartsServiceError>;

    /// Replace the quantity of an existing entry.
    async fn set_quantity(
        &self,
        caller: &Caller,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartEntryRecord, CartsServiceError>;

    /// Remove an entry from the caller's cart.
    async fn remove_item(&self, caller: &Caller, product: ProductUuid)
    -> Result<(), CartsServiceError>;
}
