//! Stock reservation.
//!
//! Decides, from a cart snapshot and the product snapshots read in the same
//! transaction, whether a checkout can proceed. Nothing here touches storage.

use crate::domain::{
    carts::records::CartEntryRecord,
    checkout::errors::CheckoutError,
    orders::records::{LineItemRecord, MAX_TOTAL},
    products::records::{ProductRecord, ProductUuid},
};

/// Change to apply to one product's quantity on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub product_uuid: ProductUuid,
    pub delta: i64,
}

/// Outcome of a successful reservation, in cart order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub items: Vec<LineItemRecord>,
    pub deltas: Vec<StockDelta>,
    pub total: u64,
}

/// Validate every cart line against its product snapshot.
///
/// Lines are checked in cart order and the first failing line aborts the
/// whole reservation.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if there are no lines.
/// - [`CheckoutError::ProductMissing`] if a product no longer exists.
/// - [`CheckoutError::InsufficientStock`] if a line asks for more than is on hand.
/// - [`CheckoutError::InvalidRequest`] if the total exceeds [`MAX_TOTAL`].
pub fn reserve(
    lines: &[(CartEntryRecord, Option<ProductRecord>)],
) -> Result<Reservation, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut deltas = Vec::with_capacity(lines.len());
    let mut total: u64 = 0;

    for (entry, product) in lines {
        let Some(product) = product else {
            return Err(CheckoutError::ProductMissing {
                product_uuid: entry.product_uuid,
            });
        };

        if entry.quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product_uuid: product.uuid,
                name: product.name.clone(),
                requested: entry.quantity,
                available: product.stock,
            });
        }

        let item = LineItemRecord {
            product_uuid: product.uuid,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: entry.quantity,
            seller: product.seller.clone(),
        };

        total = item
            .subtotal()
            .and_then(|subtotal| total.checked_add(subtotal))
            .filter(|total| *total <= MAX_TOTAL)
            .ok_or(CheckoutError::InvalidRequest("order total is too large"))?;

        deltas.push(StockDelta {
            product_uuid: product.uuid,
            delta: -i64::from(entry.quantity),
        });

        items.push(item);
    }

    Ok(Reservation {
        items,
        deltas,
        total,
    })
}
