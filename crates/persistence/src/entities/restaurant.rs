//! Restaurant entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Restaurant;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the restaurants table.
#[derive(Debug, Clone, FromRow)]
pub struct RestaurantEntity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub cover_image: Option<String>,
    pub address: String,
    pub phone: String,
    pub rating: Decimal,
    pub rating_count: i32,
    pub delivery_time: String,
    pub delivery_fee: i64,
    pub minimum_order: i64,
    pub is_open: bool,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<RestaurantEntity> for Restaurant {
    fn from(entity: RestaurantEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            image: entity.image,
            cover_image: entity.cover_image,
            address: entity.address,
            phone: entity.phone,
            rating: entity.rating,
            rating_count: entity.rating_count,
            delivery_time: entity.delivery_time,
            delivery_fee: entity.delivery_fee,
            minimum_order: entity.minimum_order,
            is_open: entity.is_open,
            is_active: entity.is_active,
            manager_id: entity.manager_id,
            created_at: entity.created_at,
        }
    }
}
