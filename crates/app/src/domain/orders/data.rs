//! Order Data

use crate::{
    auth::UserId,
    domain::orders::records::{LineItemRecord, OrderUuid},
};

/// New Order Data
///
/// Orders always start `Pending`; the store assigns timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer: UserId,
    pub items: Vec<LineItemRecord>,
    pub payment_method: String,
    pub shipping_address: String,
    pub total: u64,
}
