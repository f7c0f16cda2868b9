//! In-memory store with optimistic concurrency control.
//!
//! Every document (a product, a customer's cart, an order) carries a version.
//! Transactions record the version of each document they read and buffer their
//! writes; `commit` applies the writes only if none of the read documents has
//! changed since, which makes committed transactions serializable.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::Mutex;

use crate::{
    auth::UserId,
    domain::{
        carts::{data::MAX_QUANTITY, records::CartEntryRecord},
        orders::{
            data::NewOrder,
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        products::{
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    store::{Store, StoreError, StoreTransaction},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DocumentKey {
    Product(ProductUuid),
    Cart(UserId),
    Order(OrderUuid),
}

type Cart = BTreeMap<ProductUuid, CartEntryRecord>;

#[derive(Debug, Default)]
struct MemoryState {
    products: FxHashMap<ProductUuid, ProductRecord>,
    carts: FxHashMap<UserId, Cart>,
    orders: FxHashMap<OrderUuid, OrderRecord>,
    versions: FxHashMap<DocumentKey, u64>,
    last_timestamp: Option<Timestamp>,
}

impl MemoryState {
    fn version(&self, key: &DocumentKey) -> u64 {
        self.versions.get(key).copied().unwrap_or_default()
    }

    fn bump(&mut self, key: DocumentKey) {
        *self.versions.entry(key).or_default() += 1;
    }

    /// Strictly increasing server clock.
    fn now(&mut self) -> Timestamp {
        let now = Timestamp::now();

        let next = match self.last_timestamp {
            Some(last) if now <= last => last
                .checked_add(SignedDuration::from_nanos(1))
                .unwrap_or(last),
            _ => now,
        };

        self.last_timestamp = Some(next);

        next
    }
}

/// Shared in-process store handle; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a product, as a seller edit would.
    pub async fn insert_product(&self, product: NewProduct) -> ProductRecord {
        let mut state = self.state.lock().await;
        let now = state.now();

        let record = ProductRecord {
            uuid: product.uuid,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            seller: product.seller,
            images: product.images,
            created_at: now,
            updated_at: now,
        };

        state.products.insert(record.uuid, record.clone());
        state.bump(DocumentKey::Product(record.uuid));

        record
    }

    /// Replace a product's quantity on hand, as a seller edit would.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the product does not exist.
    pub async fn set_stock(
        &self,
        product: ProductUuid,
        stock: u32,
    ) -> Result<ProductRecord, StoreError> {
        let mut state = self.state.lock().await;
        let now = state.now();

        let record = state
            .products
            .get_mut(&product)
            .ok_or(StoreError::NotFound)?;

        record.stock = stock;
        record.updated_at = now;

        let updated = record.clone();

        state.bump(DocumentKey::Product(product));

        Ok(updated)
    }

    /// Delete a product; returns whether it existed.
    pub async fn remove_product(&self, product: ProductUuid) -> bool {
        let mut state = self.state.lock().await;

        let removed = state.products.remove(&product).is_some();

        if removed {
            state.bump(DocumentKey::Product(product));
        }

        removed
    }

    /// Committed snapshot of a product.
    pub async fn product(&self, product: ProductUuid) -> Option<ProductRecord> {
        self.state.lock().await.products.get(&product).cloned()
    }

    /// Committed snapshot of a customer's cart.
    pub async fn cart(&self, customer: &UserId) -> Vec<CartEntryRecord> {
        self.state
            .lock()
            .await
            .carts
            .get(customer)
            .map(|cart| cart.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Committed snapshot of an order.
    pub async fn order(&self, order: OrderUuid) -> Option<OrderRecord> {
        self.state.lock().await.orders.get(&order).cloned()
    }

    /// Number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        Ok(MemoryTransaction {
            state: Arc::clone(&self.state),
            observed: FxHashMap::default(),
            products: FxHashMap::default(),
            carts: FxHashMap::default(),
            orders: FxHashMap::default(),
            written: FxHashSet::default(),
        })
    }
}

/// Buffered transaction over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    observed: FxHashMap<DocumentKey, u64>,
    products: FxHashMap<ProductUuid, Option<ProductRecord>>,
    carts: FxHashMap<UserId, Cart>,
    orders: FxHashMap<OrderUuid, Option<OrderRecord>>,
    written: FxHashSet<DocumentKey>,
}

impl MemoryTransaction {
    async fn now(&self) -> Timestamp {
        self.state.lock().await.now()
    }

    async fn load_product(&mut self, product: ProductUuid) {
        if self.products.contains_key(&product) {
            return;
        }

        let state = self.state.lock().await;
        let key = DocumentKey::Product(product);
        let version = state.version(&key);

        self.observed.entry(key).or_insert(version);
        self.products
            .insert(product, state.products.get(&product).cloned());
    }

    async fn load_cart(&mut self, customer: &UserId) {
        if self.carts.contains_key(customer) {
            return;
        }

        let state = self.state.lock().await;
        let key = DocumentKey::Cart(customer.clone());
        let version = state.version(&key);

        self.observed.entry(key).or_insert(version);
        self.carts.insert(
            customer.clone(),
            state.carts.get(customer).cloned().unwrap_or_default(),
        );
    }

    async fn load_order(&mut self, order: OrderUuid) {
        if self.orders.contains_key(&order) {
            return;
        }

        let state = self.state.lock().await;
        let key = DocumentKey::Order(order);
        let version = state.version(&key);

        self.observed.entry(key).or_insert(version);
        self.orders.insert(order, state.orders.get(&order).cloned());
    }

    /// Committed orders overlaid with this transaction's buffered orders.
    async fn visible_orders<P>(&self, predicate: P) -> Vec<OrderRecord>
    where
        P: Fn(&OrderRecord) -> bool,
    {
        let state = self.state.lock().await;

        let mut merged: FxHashMap<OrderUuid, &OrderRecord> = state
            .orders
            .iter()
            .map(|(uuid, order)| (*uuid, order))
            .collect();

        for (uuid, order) in &self.orders {
            if let Some(order) = order {
                merged.insert(*uuid, order);
            }
        }

        let mut orders: Vec<OrderRecord> = merged
            .into_values()
            .filter(|order| predicate(order))
            .cloned()
            .collect();

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.uuid.cmp(&a.uuid))
        });

        orders
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn product(
        &mut self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, StoreError> {
        self.load_product(product).await;

        Ok(self.products.get(&product).cloned().flatten())
    }

    async fn apply_stock_delta(
        &mut self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.load_product(product).await;

        let now = self.now().await;

        let record = self
            .products
            .get_mut(&product)
            .and_then(Option::as_mut)
            .ok_or(StoreError::NotFound)?;

        let stock = i64::from(record.stock)
            .checked_add(delta)
            .and_then(|stock| u32::try_from(stock).ok())
            .ok_or(StoreError::Constraint)?;

        record.stock = stock;
        record.updated_at = now;

        self.written.insert(DocumentKey::Product(product));

        Ok(())
    }

    async fn cart_entries(
        &mut self,
        customer: &UserId,
    ) -> Result<Vec<CartEntryRecord>, StoreError> {
        self.load_cart(customer).await;

        Ok(self
            .carts
            .get(customer)
            .map(|cart| cart.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartEntryRecord, StoreError> {
        if quantity == 0 || quantity > MAX_QUANTITY {
            return Err(StoreError::Constraint);
        }

        self.load_cart(customer).await;

        let entry = CartEntryRecord {
            product_uuid: product,
            quantity,
            updated_at: self.now().await,
        };

        self.carts
            .entry(customer.clone())
            .or_default()
            .insert(product, entry.clone());

        self.written.insert(DocumentKey::Cart(customer.clone()));

        Ok(entry)
    }

    async fn delete_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
    ) -> Result<bool, StoreError> {
        self.load_cart(customer).await;

        let removed = self
            .carts
            .get_mut(customer)
            .is_some_and(|cart| cart.remove(&product).is_some());

        if removed {
            self.written.insert(DocumentKey::Cart(customer.clone()));
        }

        Ok(removed)
    }

    async fn clear_cart(&mut self, customer: &UserId) -> Result<u64, StoreError> {
        self.load_cart(customer).await;

        let removed = self.carts.get_mut(customer).map_or(0, |cart| {
            let count = cart.len();

            cart.clear();

            count
        });

        if removed > 0 {
            self.written.insert(DocumentKey::Cart(customer.clone()));
        }

        u64::try_from(removed).map_err(|_| StoreError::Constraint)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord, StoreError> {
        let exists = self.state.lock().await.orders.contains_key(&order.uuid)
            || matches!(self.orders.get(&order.uuid), Some(Some(_)));

        if exists {
            return Err(StoreError::Constraint);
        }

        let now = self.now().await;

        let record = OrderRecord {
            uuid: order.uuid,
            customer: order.customer,
            items: order.items,
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            status: OrderStatus::Pending,
            total: order.total,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(record.uuid, Some(record.clone()));
        self.written.insert(DocumentKey::Order(record.uuid));

        Ok(record)
    }

    async fn order(&mut self, order: OrderUuid) -> Result<Option<OrderRecord>, StoreError> {
        self.load_order(order).await;

        Ok(self.orders.get(&order).cloned().flatten())
    }

    async fn set_order_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError> {
        self.load_order(order).await;

        let now = self.now().await;

        let record = self
            .orders
            .get_mut(&order)
            .and_then(Option::as_mut)
            .ok_or(StoreError::NotFound)?;

        record.status = status;
        record.updated_at = now;

        let updated = record.clone();

        self.written.insert(DocumentKey::Order(order));

        Ok(updated)
    }

    async fn orders_for_customer(
        &mut self,
        customer: &UserId,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self
            .visible_orders(|order| order.customer == *customer)
            .await)
    }

    async fn orders_for_seller(
        &mut self,
        seller: &UserId,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self
            .visible_orders(|order| order.includes_seller(seller))
            .await)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Self {
            state: shared,
            observed,
            mut products,
            mut carts,
            mut orders,
            written,
        } = self;

        let mut state = shared.lock().await;

        if observed
            .iter()
            .any(|(key, version)| state.version(key) != *version)
        {
            return Err(StoreError::Conflict);
        }

        for key in written {
            state.bump(key.clone());

            match key {
                DocumentKey::Product(uuid) => match products.remove(&uuid).flatten() {
                    Some(product) => {
                        state.products.insert(uuid, product);
                    }
                    None => {
                        state.products.remove(&uuid);
                    }
                },
                DocumentKey::Cart(customer) => {
                    let cart = carts.remove(&customer).unwrap_or_default();

                    if cart.is_empty() {
                        state.carts.remove(&customer);
                    } else {
                        state.carts.insert(customer, cart);
                    }
                }
                DocumentKey::Order(uuid) => {
                    if let Some(order) = orders.remove(&uuid).flatten() {
                        state.orders.insert(uuid, order);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn new_product(stock: u32) -> NewProduct {
        NewProduct {
            uuid: ProductUuid::new(),
            name: "Mug".to_string(),
            description: "Ceramic".to_string(),
            price: 8_00,
            stock,
            seller: UserId::from("seller"),
            images: Vec::new(),
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() -> TestResult {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(5)).await;

        let mut tx = store.begin().await?;
        tx.apply_stock_delta(product.uuid, -2).await?;
        drop(tx);

        assert_eq!(store.product(product.uuid).await.map(|p| p.stock), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn transaction_reads_its_own_writes() -> TestResult {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(5)).await;

        let mut tx = store.begin().await?;
        tx.apply_stock_delta(product.uuid, -2).await?;

        let seen = tx.product(product.uuid).await?.map(|p| p.stock);

        assert_eq!(seen, Some(3));

        tx.commit().await?;

        assert_eq!(store.product(product.uuid).await.map(|p| p.stock), Some(3));

        Ok(())
    }

    #[tokio::test]
    async fn negative_stock_is_rejected() -> TestResult {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(1)).await;

        let mut tx = store.begin().await?;
        let result = tx.apply_stock_delta(product.uuid, -2).await;

        assert!(
            matches!(result, Err(StoreError::Constraint)),
            "expected Constraint, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_read_fails_commit() -> TestResult {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(1)).await;

        let mut first = store.begin().await?;
        let mut second = store.begin().await?;

        first.product(product.uuid).await?;
        second.product(product.uuid).await?;

        first.apply_stock_delta(product.uuid, -1).await?;
        second.apply_stock_delta(product.uuid, -1).await?;

        first.commit().await?;

        let result = second.commit().await;

        assert!(
            matches!(result, Err(StoreError::Conflict)),
            "expected Conflict, got {result:?}"
        );
        assert_eq!(store.product(product.uuid).await.map(|p| p.stock), Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn seller_edit_conflicts_with_open_transaction() -> TestResult {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(3)).await;

        let mut tx = store.begin().await?;
        tx.product(product.uuid).await?;

        store.set_stock(product.uuid, 10).await?;

        tx.apply_stock_delta(product.uuid, -1).await?;

        assert!(matches!(tx.commit().await, Err(StoreError::Conflict)));
        assert_eq!(store.product(product.uuid).await.map(|p| p.stock), Some(10));

        Ok(())
    }

    #[tokio::test]
    async fn clearing_cart_removes_every_entry() -> TestResult {
        let store = MemoryStore::new();
        let customer = UserId::from("customer");

        let mut tx = store.begin().await?;
        tx.put_cart_entry(&customer, ProductUuid::new(), 1).await?;
        tx.put_cart_entry(&customer, ProductUuid::new(), 2).await?;
        tx.commit().await?;

        let mut tx = store.begin().await?;
        assert_eq!(tx.clear_cart(&customer).await?, 2);
        tx.commit().await?;

        assert!(store.cart(&customer).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn cart_quantities_beyond_the_column_range_are_rejected() -> TestResult {
        let store = MemoryStore::new();
        let customer = UserId::from("customer");

        let mut tx = store.begin().await?;

        assert!(tx.put_cart_entry(&customer, ProductUuid::new(), MAX_QUANTITY).await.is_ok());

        let result = tx
            .put_cart_entry(&customer, ProductUuid::new(), MAX_QUANTITY + 1)
            .await;

        assert!(
            matches!(result, Err(StoreError::Constraint)),
            "expected Constraint, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn order_timestamps_are_strictly_increasing() -> TestResult {
        let store = MemoryStore::new();
        let customer = UserId::from("customer");

        let mut tx = store.begin().await?;
        let mut previous: Option<Timestamp> = None;

        for _ in 0..10 {
            let order = tx
                .insert_order(NewOrder {
                    uuid: OrderUuid::new(),
                    customer: customer.clone(),
                    items: Vec::new(),
                    payment_method: "card".to_string(),
                    shipping_address: "1 Main St".to_string(),
                    total: 0,
                })
                .await?;

            if let Some(previous) = previous {
                assert!(order.created_at > previous, "timestamps must increase");
            }

            previous = Some(order.created_at);
        }

        tx.commit().await?;

        let mut tx = store.begin().await?;
        let listed = tx.orders_for_customer(&customer).await?;

        assert_eq!(listed.len(), 10);
        assert!(
            listed
                .windows(2)
                .all(|pair| matches!(pair, [newer, older] if newer.created_at > older.created_at)),
            "orders should be listed newest first"
        );

        Ok(())
    }
}
