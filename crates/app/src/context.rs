//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, IdentityClient, RemoteAuthService},
    database::{self, Db},
    domain::{
        carts::{CartsService, StoreCartsService},
        checkout::{CheckoutService, StoreCheckoutService},
        orders::{OrdersService, StoreOrdersService},
    },
    store::{PgStore, RetryPolicy, Store},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        identity: IdentityClient,
        retry: RetryPolicy,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let store = PgStore::new(Db::new(pool));

        Ok(Self::from_store(
            store,
            Arc::new(RemoteAuthService::new(identity)),
            retry,
        ))
    }

    /// Wire every service to the same store.
    #[must_use]
    pub fn from_store<S>(store: S, auth: Arc<dyn AuthService>, retry: RetryPolicy) -> Self
    where
        S: Store + Clone,
    {
        Self {
            carts: Arc::new(StoreCartsService::new(store.clone(), retry)),
            checkout: Arc::new(StoreCheckoutService::new(store.clone(), retry)),
            orders: Arc::new(StoreOrdersService::new(store, retry)),
            auth,
        }
    }
}
