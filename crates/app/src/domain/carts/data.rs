//! Cart Data

use crate::domain::products::records::ProductUuid;

/// Largest quantity a cart entry or order line may hold.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// New Cart Item Data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}
