//! Order Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use thiserror::Error;

use crate::{auth::UserId, domain::products::records::ProductUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order status, ordered by lifecycle progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Shipped,
    Completed,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Pending, Self::Accepted, Self::Shipped, Self::Completed]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or(UnknownOrderStatus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown order status")]
pub struct UnknownOrderStatus;

/// Line item snapshot captured at checkout time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRecord {
    pub product_uuid: ProductUuid,
    pub name: String,

    /// Unit price in minor currency units at checkout time.
    pub unit_price: u64,
    pub quantity: u32,

    /// Seller owning the product at checkout time.
    pub seller: UserId,
}

impl LineItemRecord {
    /// Price multiplied by quantity, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// Largest order total, in minor currency units, that storage can hold.
pub const MAX_TOTAL: u64 = i64::MAX.unsigned_abs();

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer: UserId,
    pub items: Vec<LineItemRecord>,
    pub payment_method: String,
    pub shipping_address: String,
    pub status: OrderStatus,

    /// Sum of line subtotals in minor currency units.
    pub total: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Whether any line item belongs to `seller`.
    #[must_use]
    pub fn includes_seller(&self, seller: &UserId) -> bool {
        self.items.iter().any(|item| item.seller == *seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_any_case() {
        assert_eq!("Accepted".parse(), Ok(OrderStatus::Accepted));
        assert_eq!(" shipped ".parse(), Ok(OrderStatus::Shipped));
        assert_eq!("cancelled".parse::<OrderStatus>(), Err(UnknownOrderStatus));
    }

    #[test]
    fn statuses_order_by_progression() {
        assert!(OrderStatus::Pending < OrderStatus::Accepted);
        assert!(OrderStatus::Accepted < OrderStatus::Shipped);
        assert!(OrderStatus::Shipped < OrderStatus::Completed);
    }

    #[test]
    fn subtotal_detects_overflow() {
        let item = LineItemRecord {
            product_uuid: ProductUuid::new(),
            name: "Huge".to_string(),
            unit_price: u64::MAX,
            quantity: 2,
            seller: UserId::from("s"),
        };

        assert_eq!(item.subtotal(), None);
    }
}
