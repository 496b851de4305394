//! Order entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Order, OrderItem, OrderStatus};
use domain::services::checkout::CheckoutLine;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `orders` joined with restaurant and driver display fields.
#[derive(Debug, Clone, FromRow)]
pub struct OrderEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub restaurant_image: Option<String>,
    pub restaurant_manager_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub status: String,
    pub total: i64,
    pub delivery_fee: i64,
    pub delivery_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderEntity {
    pub fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            restaurant_id: self.restaurant_id,
            restaurant_name: self.restaurant_name,
            restaurant_image: self.restaurant_image,
            restaurant_manager_id: self.restaurant_manager_id,
            driver_id: self.driver_id,
            driver_name: self.driver_name,
            status: self.status.parse().unwrap_or(OrderStatus::Pending),
            total: self.total,
            delivery_fee: self.delivery_fee,
            delivery_address: self.delivery_address,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            notes: self.notes,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row mapping for the order_items table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemEntity {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i32,
}

impl From<OrderItemEntity> for OrderItem {
    fn from(entity: OrderItemEntity) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            product_id: entity.product_id,
            product_name: entity.product_name,
            product_price: entity.product_price,
            quantity: entity.quantity,
        }
    }
}

/// A locked cart line with the product values checkout snapshots.
#[derive(Debug, Clone, FromRow)]
pub struct CheckoutLineEntity {
    pub product_id: i64,
    pub restaurant_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl From<CheckoutLineEntity> for CheckoutLine {
    fn from(entity: CheckoutLineEntity) -> Self {
        Self {
            product_id: entity.product_id,
            restaurant_id: entity.restaurant_id,
            product_name: entity.product_name,
            unit_price: entity.unit_price,
            quantity: entity.quantity,
        }
    }
}
