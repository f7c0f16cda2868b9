//! Product Records

use jiff::Timestamp;

use crate::{auth::UserId, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,

    /// Unit price in minor currency units.
    pub price: u64,

    /// Quantity on hand.
    pub stock: u32,

    /// Owning seller.
    pub seller: UserId,

    pub images: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
