//! Checkout service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{Caller, Resource, capability},
    domain::{
        checkout::{data::CheckoutRequest, errors::CheckoutError, reservation::reserve},
        orders::{
            data::NewOrder,
            records::{OrderRecord, OrderUuid},
        },
    },
    store::{RetryPolicy, Store, StoreTransaction, with_retries},
};

#[derive(Debug, Clone)]
pub struct StoreCheckoutService<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: Store> StoreCheckoutService<S> {
    #[must_use]
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// One read-validate-write pass. Any error drops the transaction, which
    /// discards every write made so far.
    async fn attempt(
        &self,
        caller: &Caller,
        request: &CheckoutRequest,
    ) -> Result<OrderRecord, CheckoutError> {
        let mut tx = self.store.begin().await?;

        let entries = tx.cart_entries(&caller.uid).await?;

        if entries.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut lines = Vec::with_capacity(entries.len());

        for entry in entries {
            let product = tx.product(entry.product_uuid).await?;

            lines.push((entry, product));
        }

        let reservation = reserve(&lines)?;

        for delta in &reservation.deltas {
            tx.apply_stock_delta(delta.product_uuid, delta.delta)
                .await?;
        }

        let order = tx
            .insert_order(NewOrder {
                uuid: OrderUuid::new(),
                customer: caller.uid.clone(),
                items: reservation.items,
                payment_method: request.payment_method.trim().to_string(),
                shipping_address: request.shipping_address.trim().to_string(),
                total: reservation.total,
            })
            .await?;

        tx.clear_cart(&caller.uid).await?;

        tx.commit().await?;

        Ok(order)
    }
}

#[async_trait]
impl<S: Store> CheckoutService for StoreCheckoutService<S> {
    #[tracing::instrument(
        name = "checkout.service.checkout",
        skip(self, caller, request),
        fields(customer = %caller.uid),
        err
    )]
    async fn checkout(
        &self,
        caller: &Caller,
        request: CheckoutRequest,
    ) -> Result<OrderRecord, CheckoutError> {
        if !capability(caller, Resource::Checkout).is_allowed() {
            return Err(CheckoutError::Forbidden);
        }

        if let Some(field) = request.missing_field() {
            return Err(CheckoutError::InvalidRequest(field));
        }

        let request = &request;

        let order = with_retries(self.retry, "checkout", move || {
            self.attempt(caller, request)
        })
        .await?;

        info!(
            order_uuid = %order.uuid,
            total = order.total,
            line_items = order.items.len(),
            "checkout committed"
        );

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Convert the caller's cart into a `Pending` order.
    ///
    /// Stock decrements, order creation and cart clearing commit together or
    /// not at all. Conflicting concurrent checkouts are retried transparently.
    async fn checkout(
        &self,
        caller: &Caller,
        request: CheckoutRequest,
    ) -> Result<OrderRecord, CheckoutError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{orders::records::OrderStatus, products::data::NewProduct},
        store::MemoryStore,
        test::{FlakyStore, TestContext, checkout_request},
    };

    use super::*;

    #[tokio::test]
    async fn checkout_decrements_stock_and_clears_cart() -> TestResult {
        let ctx = TestContext::new();
        let p1 = ctx.create_product(&ctx.seller, 10_00, 5).await;

        ctx.add_to_cart(&ctx.customer, p1.uuid, 2).await?;

        let order = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 20_00);
        assert_eq!(order.customer, ctx.customer.uid);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, 10_00);

        assert_eq!(ctx.stock(p1.uuid).await, Some(3));
        assert!(ctx.store.cart(&ctx.customer.uid).await.is_empty());
        assert_eq!(ctx.store.order(order.uuid).await, Some(order));

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_changes_nothing() -> TestResult {
        let ctx = TestContext::new();
        let p2 = ctx.create_product(&ctx.seller, 4_00, 1).await;

        ctx.add_to_cart(&ctx.customer, p2.uuid, 3).await?;

        let result = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::InsufficientStock {
                    requested: 3,
                    available: 1,
                    ..
                })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        assert_eq!(ctx.stock(p2.uuid).await, Some(1));
        assert_eq!(ctx.store.cart(&ctx.customer.uid).await.len(), 1);
        assert_eq!(ctx.store.order_count().await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn one_short_line_leaves_every_product_untouched() -> TestResult {
        let ctx = TestContext::new();
        let plenty = ctx.create_product(&ctx.seller, 1_00, 10).await;
        let scarce = ctx.create_product(&ctx.seller, 2_00, 1).await;

        ctx.add_to_cart(&ctx.customer, plenty.uuid, 4).await?;
        ctx.add_to_cart(&ctx.customer, scarce.uuid, 2).await?;

        let result = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await;

        assert!(matches!(result, Err(CheckoutError::InsufficientStock { .. })));
        assert_eq!(ctx.stock(plenty.uuid).await, Some(10));
        assert_eq!(ctx.stock(scarce.uuid).await, Some(1));
        assert_eq!(ctx.store.cart(&ctx.customer.uid).await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn stock_is_conserved_across_lines() -> TestResult {
        let ctx = TestContext::new();
        let other_seller = Caller::seller("other-seller");
        let mug = ctx.create_product(&ctx.seller, 8_00, 10).await;
        let lamp = ctx.create_product(&other_seller, 30_00, 3).await;

        ctx.add_to_cart(&ctx.customer, mug.uuid, 4).await?;
        ctx.add_to_cart(&ctx.customer, lamp.uuid, 3).await?;

        let order = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await?;

        assert_eq!(ctx.stock(mug.uuid).await, Some(6));
        assert_eq!(ctx.stock(lamp.uuid).await, Some(0));

        let expected: u64 = order
            .items
            .iter()
            .map(|item| item.unit_price * u64::from(item.quantity))
            .sum();

        assert_eq!(order.total, expected);
        assert_eq!(order.total, 4 * 8_00 + 3 * 30_00);
        assert!(order.includes_seller(&ctx.seller.uid));
        assert!(order.includes_seller(&other_seller.uid));

        Ok(())
    }

    #[tokio::test]
    async fn resubmitting_after_success_finds_empty_cart() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product(&ctx.seller, 10_00, 5).await;

        ctx.add_to_cart(&ctx.customer, product.uuid, 1).await?;

        ctx.checkout
            .checkout(&ctx.customer, checkout_request())
            .await?;

        let again = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await;

        assert!(
            matches!(again, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {again:?}"
        );
        assert_eq!(ctx.stock(product.uuid).await, Some(4));
        assert_eq!(ctx.store.order_count().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_reports_product_missing() -> TestResult {
        let ctx = TestContext::new();
        let kept = ctx.create_product(&ctx.seller, 1_00, 5).await;
        let removed = ctx.create_product(&ctx.seller, 1_00, 5).await;

        ctx.add_to_cart(&ctx.customer, kept.uuid, 1).await?;
        ctx.add_to_cart(&ctx.customer, removed.uuid, 1).await?;

        assert!(ctx.store.remove_product(removed.uuid).await);

        let result = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::ProductMissing { product_uuid }) if product_uuid == removed.uuid
            ),
            "expected ProductMissing, got {result:?}"
        );
        assert_eq!(ctx.stock(kept.uuid).await, Some(5));
        assert_eq!(ctx.store.cart(&ctx.customer.uid).await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn later_product_edits_do_not_change_orders() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product(&ctx.seller, 10_00, 5).await;

        ctx.add_to_cart(&ctx.customer, product.uuid, 1).await?;

        let order = ctx
            .checkout
            .checkout(&ctx.customer, checkout_request())
            .await?;

        ctx.store
            .insert_product(NewProduct {
                uuid: product.uuid,
                name: "Renamed".to_string(),
                description: product.description.clone(),
                price: 99_00,
                stock: 50,
                seller: product.seller.clone(),
                images: Vec::new(),
            })
            .await;

        let stored = ctx
            .store
            .order(order.uuid)
            .await
            .ok_or("order should exist")?;

        assert_eq!(stored.items[0].name, product.name);
        assert_eq!(stored.items[0].unit_price, 10_00);
        assert_eq!(stored.total, 10_00);

        Ok(())
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_storage() -> TestResult {
        let flaky = FlakyStore::new(MemoryStore::new(), 0);
        let service = StoreCheckoutService::new(flaky.clone(), RetryPolicy::default());

        let result = service
            .checkout(
                &Caller::customer("customer"),
                CheckoutRequest {
                    payment_method: " ".to_string(),
                    shipping_address: "1 Main St".to_string(),
                },
            )
            .await;

        assert!(
            matches!(result, Err(CheckoutError::InvalidRequest("payment_method"))),
            "expected InvalidRequest, got {result:?}"
        );
        assert_eq!(flaky.begins(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn sellers_cannot_check_out() {
        let ctx = TestContext::new();

        let result = ctx.checkout.checkout(&ctx.seller, checkout_request()).await;

        assert!(
            matches!(result, Err(CheckoutError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn last_unit_is_sold_exactly_once() -> TestResult {
        const CONTENDERS: usize = 8;

        let ctx = TestContext::new();
        let product = ctx.create_product(&ctx.seller, 15_00, 1).await;

        let mut customers = Vec::with_capacity(CONTENDERS);

        for index in 0..CONTENDERS {
            let customer = Caller::customer(format!("customer-{index}"));

            ctx.add_to_cart(&customer, product.uuid, 1).await?;

            customers.push(customer);
        }

        let handles: Vec<_> = customers
            .into_iter()
            .map(|customer| {
                let checkout = ctx.checkout.clone();

                tokio::spawn(async move { checkout.checkout(&customer, checkout_request()).await })
            })
            .collect();

        let mut successes = 0;
        let mut sold_out = 0;

        for handle in handles {
            match handle.await? {
                Ok(_) => successes += 1,
                Err(CheckoutError::InsufficientStock { available: 0, .. }) => sold_out += 1,
                Err(other) => return Err(format!("unexpected checkout error: {other}").into()),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(sold_out, CONTENDERS - 1);
        assert_eq!(ctx.stock(product.uuid).await, Some(0));
        assert_eq!(ctx.store.order_count().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn conflicts_are_retried_transparently() -> TestResult {
        let memory = MemoryStore::new();
        let flaky = FlakyStore::new(memory.clone(), 2);
        let ctx = TestContext::with_store(memory);
        let checkout = StoreCheckoutService::new(flaky.clone(), RetryPolicy::new(5));

        let product = ctx.create_product(&ctx.seller, 10_00, 5).await;

        ctx.add_to_cart(&ctx.customer, product.uuid, 2).await?;

        let order = checkout.checkout(&ctx.customer, checkout_request()).await?;

        assert_eq!(flaky.begins(), 3);
        assert_eq!(ctx.stock(product.uuid).await, Some(3));
        assert_eq!(ctx.store.order_count().await, 1);
        assert_eq!(ctx.store.order(order.uuid).await, Some(order));

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_retries_surface_transient_conflict() -> TestResult {
        let memory = MemoryStore::new();
        let flaky = FlakyStore::new(memory.clone(), u32::MAX);
        let ctx = TestContext::with_store(memory);
        let checkout = StoreCheckoutService::new(flaky.clone(), RetryPolicy::new(3));

        let product = ctx.create_product(&ctx.seller, 10_00, 5).await;

        ctx.add_to_cart(&ctx.customer, product.uuid, 2).await?;

        let result = checkout.checkout(&ctx.customer, checkout_request()).await;

        assert!(
            matches!(result, Err(CheckoutError::TransientStoreConflict)),
            "expected TransientStoreConflict, got {result:?}"
        );
        assert_eq!(flaky.begins(), 3);
        assert_eq!(ctx.stock(product.uuid).await, Some(5));
        assert_eq!(ctx.store.cart(&ctx.customer.uid).await.len(), 1);
        assert_eq!(ctx.store.order_count().await, 0);

        Ok(())
    }
}
