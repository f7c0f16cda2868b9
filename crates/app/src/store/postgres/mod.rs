//! `PostgreSQL` store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::UserId,
    database::Db,
    domain::{
        carts::records::CartEntryRecord,
        orders::{
            data::NewOrder,
            records::{LineItemRecord, OrderRecord, OrderStatus, OrderUuid},
        },
        products::records::{ProductRecord, ProductUuid},
    },
    store::{Store, StoreError, StoreTransaction},
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const APPLY_STOCK_DELTA_SQL: &str = include_str!("sql/apply_stock_delta.sql");
const GET_CART_ENTRIES_SQL: &str = include_str!("sql/get_cart_entries.sql");
const UPSERT_CART_ENTRY_SQL: &str = include_str!("sql/upsert_cart_entry.sql");
const DELETE_CART_ENTRY_SQL: &str = include_str!("sql/delete_cart_entry.sql");
const CLEAR_CART_SQL: &str = include_str!("sql/clear_cart.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const LIST_CUSTOMER_ORDERS_SQL: &str = include_str!("sql/list_customer_orders.sql");
const LIST_SELLER_ORDERS_SQL: &str = include_str!("sql/list_seller_orders.sql");

#[derive(Debug, Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        Ok(PgTransaction {
            tx: self.db.begin_serializable().await?,
        })
    }
}

/// Serializable `PostgreSQL` transaction; rolled back on drop.
#[derive(Debug)]
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgTransaction {
    async fn with_items(
        &mut self,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut *self.tx)
            .await?;

        let mut items: FxHashMap<OrderUuid, Vec<LineItemRecord>> = FxHashMap::default();

        for row in rows {
            items.entry(row.order_uuid).or_default().push(row.item);
        }

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn product(
        &mut self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, StoreError> {
        Ok(query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn apply_stock_delta(
        &mut self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<(), StoreError> {
        let rows_affected = query(APPLY_STOCK_DELTA_SQL)
            .bind(product.into_uuid())
            .bind(delta)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn cart_entries(
        &mut self,
        customer: &UserId,
    ) -> Result<Vec<CartEntryRecord>, StoreError> {
        Ok(query_as::<Postgres, CartEntryRecord>(GET_CART_ENTRIES_SQL)
            .bind(customer.as_str())
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn put_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartEntryRecord, StoreError> {
        Ok(query_as::<Postgres, CartEntryRecord>(UPSERT_CART_ENTRY_SQL)
            .bind(customer.as_str())
            .bind(product.into_uuid())
            .bind(to_count(quantity)?)
            .fetch_one(&mut *self.tx)
            .await?)
    }

    async fn delete_cart_entry(
        &mut self,
        customer: &UserId,
        product: ProductUuid,
    ) -> Result<bool, StoreError> {
        let rows_affected = query(DELETE_CART_ENTRY_SQL)
            .bind(customer.as_str())
            .bind(product.into_uuid())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn clear_cart(&mut self, customer: &UserId) -> Result<u64, StoreError> {
        let rows_affected = query(CLEAR_CART_SQL)
            .bind(customer.as_str())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderRecord, StoreError> {
        let mut record = query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.customer.as_str())
            .bind(&order.payment_method)
            .bind(&order.shipping_address)
            .bind(to_amount(order.total)?)
            .fetch_one(&mut *self.tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| StoreError::Constraint)?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(order.uuid.into_uuid())
                .bind(position)
                .bind(item.product_uuid.into_uuid())
                .bind(&item.name)
                .bind(to_amount(item.unit_price)?)
                .bind(to_count(item.quantity)?)
                .bind(item.seller.as_str())
                .execute(&mut *self.tx)
                .await?;
        }

        record.items = order.items;

        Ok(record)
    }

    async fn order(&mut self, order: OrderUuid) -> Result<Option<OrderRecord>, StoreError> {
        let Some(record) = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut *self.tx)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.with_items(vec![record]).await?.pop())
    }

    async fn set_order_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError> {
        let record = query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut *self.tx)
            .await?;

        self.with_items(vec![record])
            .await?
            .pop()
            .ok_or(StoreError::NotFound)
    }

    async fn orders_for_customer(
        &mut self,
        customer: &UserId,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_CUSTOMER_ORDERS_SQL)
            .bind(customer.as_str())
            .fetch_all(&mut *self.tx)
            .await?;

        self.with_items(orders).await
    }

    async fn orders_for_seller(
        &mut self,
        seller: &UserId,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_SELLER_ORDERS_SQL)
            .bind(seller.as_str())
            .fetch_all(&mut *self.tx)
            .await?;

        self.with_items(orders).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;

        Ok(())
    }
}

struct OrderItemRow {
    order_uuid: OrderUuid,
    item: LineItemRecord,
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: try_get_amount(row, "price")?,
            stock: try_get_count(row, "stock")?,
            seller: UserId::from(row.try_get::<String, _>("seller_id")?),
            images: row.try_get("images")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartEntryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_count(row, "quantity")?,
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            customer: UserId::from(row.try_get::<String, _>("customer_id")?),
            items: Vec::new(),
            payment_method: row.try_get("payment_method")?,
            shipping_address: row.try_get("shipping_address")?,
            status,
            total: try_get_amount(row, "total")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: LineItemRecord {
                product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                name: row.try_get("name")?,
                unit_price: try_get_amount(row, "unit_price")?,
                quantity: try_get_count(row, "quantity")?,
                seller: UserId::from(row.try_get::<String, _>("seller_id")?),
            },
        })
    }
}

fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i32: i32 = row.try_get(col)?;

    u32::try_from(count_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn to_amount(amount: u64) -> Result<i64, StoreError> {
    i64::try_from(amount).map_err(|_| StoreError::Constraint)
}

fn to_count(count: u32) -> Result<i32, StoreError> {
    i32::try_from(count).map_err(|_| StoreError::Constraint)
}
