//! State

use std::sync::Arc;

use bazaar_app::{
    auth::AuthService,
    context::AppContext,
    domain::{carts::CartsService, checkout::CheckoutService, orders::OrdersService},
};

/// Services shared by every request handler.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) carts: Arc<dyn CartsService>,
    pub(crate) checkout: Arc<dyn CheckoutService>,
    pub(crate) orders: Arc<dyn OrdersService>,
    pub(crate) auth: Arc<dyn AuthService>,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self {
            carts: app.carts,
            checkout: app.checkout,
            orders: app.orders,
            auth: app.auth,
        })
    }
}
