//! Cart Records

use jiff::Timestamp;

use crate::domain::products::records::ProductUuid;

/// One line of a customer's cart, keyed by product.
///
/// The quantity is a desire, not a reservation; stock is checked at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntryRecord {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub updated_at: Timestamp,
}
