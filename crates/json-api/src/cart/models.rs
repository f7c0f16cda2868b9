//! Cart Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::carts::records::CartEntryRecord;

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Entries in product order
    pub items: Vec<CartEntryResponse>,
}

impl From<Vec<CartEntryRecord>> for CartResponse {
    fn from(entries: Vec<CartEntryRecord>) -> Self {
        Self {
            items: entries.into_iter().map(CartEntryResponse::from).collect(),
        }
    }
}

/// Cart Entry Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartEntryResponse {
    /// Product in the cart
    pub product_uuid: Uuid,

    /// Requested quantity
    pub quantity: u32,

    /// The date and time the entry was last changed
    pub updated_at: String,
}

impl From<CartEntryRecord> for CartEntryResponse {
    fn from(entry: CartEntryRecord) -> Self {
        Self {
            product_uuid: entry.product_uuid.into(),
            quantity: entry.quantity,
            updated_at: entry.updated_at.to_string(),
        }
    }
}
