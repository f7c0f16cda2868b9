//! Order Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::orders::records::{LineItemRecord, OrderRecord};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// Customer who placed the order
    pub customer: String,

    /// Line items captured at checkout time
    pub items: Vec<LineItemResponse>,

    pub payment_method: String,
    pub shipping_address: String,

    /// One of `pending`, `accepted`, `shipped`, `completed`
    pub status: String,

    /// Order total in minor currency units
    pub total: u64,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the status last changed
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            customer: order.customer.into_string(),
            items: order.items.into_iter().map(LineItemResponse::from).collect(),
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            status: order.status.to_string(),
            total: order.total,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Line Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemResponse {
    pub product_uuid: Uuid,

    /// Product name at checkout time
    pub name: String,

    /// Unit price in minor currency units at checkout time
    pub unit_price: u64,

    pub quantity: u32,

    /// Seller owning the product at checkout time
    pub seller: String,
}

impl From<LineItemRecord> for LineItemResponse {
    fn from(item: LineItemRecord) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            name: item.name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            seller: item.seller.into_string(),
        }
    }
}

/// Order List Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderListResponse {
    /// Orders, newest first
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<OrderRecord>> for OrderListResponse {
    fn from(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders: orders.into_iter().map(OrderResponse::from).collect(),
        }
    }
}
