//! Authorization capability checks.

use crate::{
    auth::{Caller, Role},
    domain::orders::records::OrderRecord,
};

/// Resource or action a caller is attempting to use.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// The caller's own cart.
    Cart,

    /// Converting the caller's cart into an order.
    Checkout,

    /// Listing orders visible to the caller.
    OrderList,

    /// Reading a single order.
    ViewOrder(&'a OrderRecord),

    /// Seller-side status transitions (accept, ship).
    AdvanceOrder(&'a OrderRecord),

    /// Customer-side completion of a shipped order.
    CompleteOrder(&'a OrderRecord),
}

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Allowed,
    Denied,
}

impl Capability {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}

/// Decide whether `caller` may act on `resource`.
#[must_use]
pub fn capability(caller: &Caller, resource: Resource<'_>) -> Capability {
    let allowed = match resource {
        Resource::Cart | Resource::Checkout => caller.role == Role::Customer,
        Resource::OrderList => true,
        Resource::ViewOrder(order) => {
            order.customer == caller.uid
                || (caller.role == Role::Seller && order.includes_seller(&caller.uid))
        }
        Resource::AdvanceOrder(order) => {
            caller.role == Role::Seller && order.includes_seller(&caller.uid)
        }
        Resource::CompleteOrder(order) => {
            caller.role == Role::Customer && order.customer == caller.uid
        }
    };

    Capability::from_bool(allowed)
}
