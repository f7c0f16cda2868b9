//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use bazaar_app::{
    auth::{Caller, MockAuthService, UserId},
    domain::{
        carts::MockCartsService,
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService,
            records::{LineItemRecord, OrderRecord, OrderStatus, OrderUuid},
        },
        products::records::ProductUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_CUSTOMER: &str = "customer-1";
pub(crate) const TEST_SELLER: &str = "seller-1";

pub(crate) fn customer() -> Caller {
    Caller::customer(TEST_CUSTOMER)
}

pub(crate) fn seller() -> Caller {
    Caller::seller(TEST_SELLER)
}

/// Pending order placed by [`TEST_CUSTOMER`] for two units sold by [`TEST_SELLER`].
pub(crate) fn make_order() -> OrderRecord {
    OrderRecord {
        uuid: OrderUuid::new(),
        customer: UserId::from(TEST_CUSTOMER),
        items: vec![LineItemRecord {
            product_uuid: ProductUuid::new(),
            name: "P1".to_owned(),
            unit_price: 10_00,
            quantity: 2,
            seller: UserId::from(TEST_SELLER),
        }],
        payment_method: "card".to_owned(),
        shipping_address: "1 Main St".to_owned(),
        status: OrderStatus::Pending,
        total: 20_00,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// Stand-in for the auth middleware: marks every request as coming from one caller.
#[derive(Debug)]
pub(crate) struct InjectCaller(Caller);

#[handler]
impl InjectCaller {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_caller(self.0.clone());
        ctrl.call_next(req, depot, res).await;
    }
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_set_quantity().never();
    carts.expect_remove_item().never();

    carts
}

fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_checkout().never();

    checkout
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_list_orders().never();
    orders.expect_get_order().never();
    orders.expect_advance_status().never();
    orders.expect_complete_order().never();

    orders
}

fn strict_state() -> State {
    State {
        carts: Arc::new(strict_carts_mock()),
        checkout: Arc::new(strict_checkout_mock()),
        orders: Arc::new(strict_orders_mock()),
        auth: Arc::new(strict_auth_mock()),
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Arc::new(State {
        auth: Arc::new(auth),
        ..strict_state()
    })
}

fn service_with(state: State, caller: Caller, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(Arc::new(state)))
            .hoop(InjectCaller(caller))
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    carts_service_as(carts, customer(), route)
}

pub(crate) fn carts_service_as(carts: MockCartsService, caller: Caller, route: Router) -> Service {
    let state = State {
        carts: Arc::new(carts),
        ..strict_state()
    };

    service_with(state, caller, route)
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    let state = State {
        checkout: Arc::new(checkout),
        ..strict_state()
    };

    service_with(state, customer(), route)
}

pub(crate) fn orders_service(orders: MockOrdersService, caller: Caller, route: Router) -> Service {
    let state = State {
        orders: Arc::new(orders),
        ..strict_state()
    };

    service_with(state, caller, route)
}
