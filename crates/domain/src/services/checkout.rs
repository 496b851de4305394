//! Turns cart lines into an order draft.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Order total is too large")]
    TotalOverflow,
}

/// A cart line joined with the product's current catalog values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: i64,
    pub restaurant_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

/// Name and price copied into an order item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineSnapshot {
    pub product_id: i64,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i32,
}

impl OrderLineSnapshot {
    /// `None` when price times quantity does not fit in an `i64`.
    pub fn subtotal(&self) -> Option<i64> {
        self.product_price.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Restaurant of the first cart line
    pub restaurant_id: i64,
    /// Sum of line subtotals, delivery fee excluded
    pub total: i64,
    pub lines: Vec<OrderLineSnapshot>,
    /// Set when lines come from more than one restaurant. Such carts are
    /// still accepted; the order is attributed to the first restaurant.
    pub spans_multiple_restaurants: bool,
}

/// Builds the draft for a checkout. Fails for an empty cart or a total that
/// overflows.
pub fn build_order_draft(lines: &[CheckoutLine]) -> Result<OrderDraft, CheckoutError> {
    let first = lines.first().ok_or(CheckoutError::EmptyCart)?;

    let snapshots: Vec<OrderLineSnapshot> = lines
        .iter()
        .map(|line| OrderLineSnapshot {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            product_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    let total = snapshots
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.subtotal()?))
        .ok_or(CheckoutError::TotalOverflow)?;

    Ok(OrderDraft {
        restaurant_id: first.restaurant_id,
        total,
        spans_multiple_restaurants: lines.iter().any(|l| l.restaurant_id != first.restaurant_id),
        lines: snapshots,
    })
}
