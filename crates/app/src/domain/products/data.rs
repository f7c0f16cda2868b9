//! Products Data

use crate::{auth::UserId, domain::products::records::ProductUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: u32,
    pub seller: UserId,
    pub images: Vec<String>,
}
