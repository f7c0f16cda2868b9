//! Order status state machine.
//!
//! `Pending -> Accepted -> Shipped -> Completed`, strictly one step at a time.
//! Sellers drive the first two steps; only the placing customer completes.

use crate::domain::orders::{errors::OrdersServiceError, records::OrderStatus};

impl OrderStatus {
    /// The only status an order in `self` may move to.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Accepted),
            Self::Accepted => Some(Self::Shipped),
            Self::Shipped => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

/// Validate a seller-requested target before any order is loaded.
///
/// # Errors
///
/// `Pending` is never a valid target ([`OrdersServiceError::InvalidStatus`]);
/// `Completed` belongs to the customer ([`OrdersServiceError::Forbidden`]).
pub fn seller_target(target: OrderStatus) -> Result<OrderStatus, OrdersServiceError> {
    match target {
        OrderStatus::Pending => Err(OrdersServiceError::InvalidStatus(target)),
        OrderStatus::Completed => Err(OrdersServiceError::Forbidden),
        OrderStatus::Accepted | OrderStatus::Shipped => Ok(target),
    }
}

/// Check that `target` is exactly the successor of `current`.
///
/// # Errors
///
/// Returns [`OrdersServiceError::IllegalTransition`] for skips, repeats and
/// regressions.
pub fn transition(current: OrderStatus, target: OrderStatus) -> Result<(), OrdersServiceError> {
    if current.next() == Some(target) {
        Ok(())
    } else {
        Err(OrdersServiceError::IllegalTransition {
            from: current,
            to: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Shipped,
        OrderStatus::Completed,
    ];

    #[test]
    fn next_walks_the_lifecycle_in_order() {
        let mut status = OrderStatus::Pending;
        let mut seen = vec![status];

        while let Some(next) = status.next() {
            assert!(next > status, "transitions must move forward");

            seen.push(next);
            status = next;
        }

        assert_eq!(seen, ALL);
    }

    #[test]
    fn only_the_immediate_successor_is_legal() {
        for from in ALL {
            for to in ALL {
                let legal = transition(from, to).is_ok();

                assert_eq!(legal, from.next() == Some(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn skipping_reports_both_ends() {
        let result = transition(OrderStatus::Pending, OrderStatus::Shipped);

        assert!(matches!(
            result,
            Err(OrdersServiceError::IllegalTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        ));
    }

    #[test]
    fn sellers_may_only_target_accepted_or_shipped() {
        assert!(matches!(
            seller_target(OrderStatus::Pending),
            Err(OrdersServiceError::InvalidStatus(OrderStatus::Pending))
        ));
        assert!(matches!(
            seller_target(OrderStatus::Completed),
            Err(OrdersServiceError::Forbidden)
        ));
        assert!(seller_target(OrderStatus::Accepted).is_ok());
        assert!(seller_target(OrderStatus::Shipped).is_ok());
    }
}
