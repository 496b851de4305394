//! Product entity joined with its restaurant and category names.

use chrono::{DateTime, Utc};
use domain::models::Product;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `products` joined with `restaurants` and `categories`.
#[derive(Debug, Clone, FromRow)]
pub struct ProductEntity {
    pub id: i64,
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

impl From<ProductEntity> for Product {
    fn from(entity: ProductEntity) -> Self {
        Self {
            id: entity.id,
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
        }
    }
}
