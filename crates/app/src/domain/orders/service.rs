//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{Caller, Resource, Role, capability},
    domain::orders::{
        errors::OrdersServiceError,
        lifecycle::{seller_target, transition},
        records::{OrderRecord, OrderStatus, OrderUuid},
    },
    store::{RetryPolicy, Store, StoreTransaction, with_retries},
};

#[derive(Debug, Clone)]
pub struct StoreOrdersService<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: Store> StoreOrdersService<S> {
    #[must_use]
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Load `order`, check `resource` against it and move it to `target`,
    /// all inside one transaction so the legality check sees current status.
    async fn transition_once(
        &self,
        caller: &Caller,
        order: OrderUuid,
        target: OrderStatus,
        resource: fn(&OrderRecord) -> Resource<'_>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if !capability(caller, resource(&current)).is_allowed() {
            return Err(OrdersServiceError::Forbidden);
        }

        transition(current.status, target)?;

        let updated = tx.set_order_status(order, target).await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[async_trait]
impl<S: Store> OrdersService for StoreOrdersService<S> {
    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self, caller),
        fields(caller = %caller.uid, role = caller.role.as_str()),
        err
    )]
    async fn list_orders(&self, caller: &Caller) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        if !capability(caller, Resource::OrderList).is_allowed() {
            return Err(OrdersServiceError::Forbidden);
        }

        let mut tx = self.store.begin().await?;

        let orders = match caller.role {
            Role::Customer => tx.orders_for_customer(&caller.uid).await?,
            Role::Seller => tx.orders_for_seller(&caller.uid).await?,
        };

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self, caller),
        fields(caller = %caller.uid, order_uuid = %order),
        err
    )]
    async fn get_order(
        &self,
        caller: &Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.store.begin().await?;

        let record = tx
            .order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        tx.commit().await?;

        if !capability(caller, Resource::ViewOrder(&record)).is_allowed() {
            return Err(OrdersServiceError::Forbidden);
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.advance_status",
        skip(self, caller),
        fields(caller = %caller.uid, order_uuid = %order, target = %target),
        err
    )]
    async fn advance_status(
        &self,
        caller: &Caller,
        order: OrderUuid,
        target: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let target = seller_target(target)?;

        let updated = with_retries(self.retry, "orders.advance_status", move || {
            self.transition_once(caller, order, target, |record| {
                Resource::AdvanceOrder(record)
            })
        })
        .await?;

        info!(order_uuid = %order, status = %updated.status, "advanced order status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.complete_order",
        skip(self, caller),
        fields(caller = %caller.uid, order_uuid = %order),
        err
    )]
    async fn complete_order(
        &self,
        caller: &Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let updated = with_retries(self.retry, "orders.complete_order", move || {
            self.transition_once(caller, order, OrderStatus::Completed, |record| {
                Resource::CompleteOrder(record)
            })
        })
        .await?;

        info!(order_uuid = %order, "completed order");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Orders visible to the caller, newest first.
    ///
    /// Customers see the orders they placed; sellers see every order with at
    /// least one of their products in it.
    async fn list_orders(&self, caller: &Caller) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieve a single order the caller placed or sells into.
    async fn get_order(
        &self,
        caller: &Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Seller moves an order one step forward (`Accepted` or `Shipped`).
    async fn advance_status(
        &self,
        caller: &Caller,
        order: OrderUuid,
        target: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Customer confirms receipt of a shipped order.
    async fn complete_order(
        &self,
        caller: &Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
