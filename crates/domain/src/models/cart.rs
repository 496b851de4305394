//! Shopping cart: one per user, one line per product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::{Product, ProductResponse};

/// Upper bound on a single line's quantity.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// A cart line with the product as it currently is in the catalog.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: i64,
    pub product: Product,
    pub quantity: i32,
}

impl CartLine {
    /// Current price times quantity, saturating at `i64::MAX`.
    pub fn subtotal(&self) -> i64 {
        self.product.price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: i64,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Sum of line subtotals, recomputed from current prices.
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.subtotal()))
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_response(&self, media_base_url: &str) -> CartResponse {
        CartResponse {
            id: self.id,
            items: self
                .lines
                .iter()
                .map(|line| CartItemResponse {
                    id: line.id,
                    product: line.product.to_response(media_base_url),
                    quantity: line.quantity,
                    subtotal: line.subtotal(),
                })
                .collect(),
            total: self.total(),
            item_count: self.item_count(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartItemResponse {
    pub id: i64,
    pub product: ProductResponse,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub id: i64,
    pub items: Vec<CartItemResponse>,
    pub total: i64,
    pub item_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCartItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    pub quantity: i32,
}

/// A quantity of zero or less removes the line.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    pub product_id: i64,
    #[validate(range(max = 999, message = "Quantity cannot exceed 999"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveCartItemQuery {
    /// Without a product id the whole cart is cleared.
    pub product_id: Option<i64>,
}

fn default_quantity() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id,
            restaurant_id: 1,
            restaurant_name: "Maquis".into(),
            restaurant_manager_id: None,
            restaurant_is_active: true,
            category_id: None,
            category_name: None,
            name: format!("Plat {}", id),
            description: String::new(),
            price,
            image: None,
            is_available: true,
            is_popular: false,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    fn cart(lines: Vec<(i64, i64, i32)>) -> Cart {
        Cart {
            id: 1,
            lines: lines
                .into_iter()
                .map(|(id, price, quantity)| CartLine {
                    id,
                    product: product(id, price),
                    quantity,
                })
                .collect(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_follow_lines() {
        let cart = cart(vec![(1, 1500, 2), (2, 750, 3)]);
        assert_eq!(cart.total(), 1500 * 2 + 750 * 3);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_huge_prices_do_not_wrap() {
        let cart = cart(vec![(1, i64::MAX / 2 + 1, 2), (2, 10, 1)]);
        assert_eq!(cart.lines[0].subtotal(), i64::MAX);
        assert_eq!(cart.total(), i64::MAX);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let cart = cart(vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_response_carries_subtotals() {
        let response = cart(vec![(4, 1200, 2)]).to_response("http://m");
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].subtotal, 2400);
        assert_eq!(response.total, 2400);
        assert_eq!(response.item_count, 2);
    }

    #[test]
    fn test_add_defaults_to_one_and_rejects_zero() {
        let req: AddCartItemRequest = serde_json::from_str(r#"{"product_id": 3}"#).unwrap();
        assert_eq!(req.quantity, 1);
        assert!(req.validate().is_ok());

        let zero: AddCartItemRequest =
            serde_json::from_str(r#"{"product_id": 3, "quantity": 0}"#).unwrap();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_update_accepts_non_positive_quantity() {
        let req: UpdateCartItemRequest =
            serde_json::from_str(r#"{"product_id": 3, "quantity": -1}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
