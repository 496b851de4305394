//! Cart entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Cart, CartLine, Product};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the carts table.
#[derive(Debug, Clone, FromRow)]
pub struct CartEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl CartEntity {
    pub fn into_cart(self, lines: Vec<CartLineEntity>) -> Cart {
        Cart {
            id: self.id,
            lines: lines.into_iter().map(CartLine::from).collect(),
            updated_at: self.updated_at,
        }
    }
}

/// A cart_items row joined with the current product.
#[derive(Debug, Clone, FromRow)]
pub struct CartLineEntity {
    pub line_id: i64,
    pub quantity: i32,
    pub product_id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub restaurant_manager_id: Option<Uuid>,
    pub restaurant_is_active: bool,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_popular: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CartLineEntity> for CartLine {
    fn from(entity: CartLineEntity) -> Self {
        Self {
            id: entity.line_id,
            quantity: entity.quantity,
            product: Product {
                id: entity.product_id,
                restaurant_id: entity.restaurant_id,
                restaurant_name: entity.restaurant_name,
                restaurant_manager_id: entity.restaurant_manager_id,
                restaurant_is_active: entity.restaurant_is_active,
                category_id: entity.category_id,
                category_name: entity.category_name,
                name: entity.name,
                description: entity.description,
                price: entity.price,
                image: entity.image,
                is_available: entity.is_available,
                is_popular: entity.is_popular,
                is_featured: entity.is_featured,
                created_at: entity.created_at,
            },
        }
    }
}
