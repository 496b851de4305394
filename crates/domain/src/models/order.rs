//! Orders and their immutable line snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_phone};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::media_url;

/// Order status vocabulary.
///
/// Any status may be assigned from any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    Assigned,
    PickedUp,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Assigned,
        OrderStatus::PickedUp,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses listed by the pending-orders view.
    pub const AWAITING_DISPATCH: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    /// Statuses counted as pending on the manager dashboard.
    pub const IN_KITCHEN: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Preparing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Assigned => "assigned",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Accepted => "Acceptée",
            OrderStatus::Preparing => "En préparation",
            OrderStatus::Ready => "Prête",
            OrderStatus::Assigned => "Assignée",
            OrderStatus::PickedUp => "Récupérée",
            OrderStatus::Delivering => "En livraison",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
        }
    }

    /// Delivered and cancelled orders are finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_strs(statuses: &[OrderStatus]) -> Vec<String> {
        statuses.iter().map(|s| s.as_str().to_string()).collect()
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid order status: {}", s))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: Uuid,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub restaurant_image: Option<String>,
    /// Manager of the ordering restaurant, used for access decisions
    pub restaurant_manager_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub status: OrderStatus,
    /// Sum of item subtotals; the delivery fee is kept separately.
    pub total: i64,
    pub delivery_fee: i64,
    pub delivery_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn to_response(&self, media_base_url: &str) -> OrderResponse {
        OrderResponse {
            id: self.id,
            restaurant: self.restaurant_id,
            restaurant_name: self.restaurant_name.clone(),
            restaurant_image: media_url(media_base_url, self.restaurant_image.as_deref()),
            driver: self.driver_id,
            driver_name: self.driver_name.clone(),
            status: self.status,
            status_display: self.status.label(),
            total: self.total,
            delivery_fee: self.delivery_fee,
            delivery_address: self.delivery_address.clone(),
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            notes: self.notes.clone(),
            items: self.items.iter().map(OrderItem::to_response).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Name and price captured at checkout. Never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        self.product_price.saturating_mul(i64::from(self.quantity))
    }

    fn to_response(&self) -> OrderItemResponse {
        OrderItemResponse {
            id: self.id,
            product_name: self.product_name.clone(),
            product_price: self.product_price,
            quantity: self.quantity,
            subtotal: self.subtotal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub restaurant: i64,
    pub restaurant_name: String,
    pub restaurant_image: Option<String>,
    pub driver: Option<Uuid>,
    pub driver_name: Option<String>,
    pub status: OrderStatus,
    pub status_display: &'static str,
    pub total: i64,
    pub delivery_fee: i64,
    pub delivery_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Delivery details supplied at checkout.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub delivery_address: String,
    #[validate(length(max = 200), custom(function = "validate_not_blank"))]
    pub customer_name: String,
    #[validate(length(max = 20), custom(function = "validate_contact_phone"))]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
}

fn validate_contact_phone(phone: &str) -> Result<(), ValidationError> {
    validate_not_blank(phone)?;
    validate_phone(phone)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<OrderStatus>,
    pub driver_id: Option<Uuid>,
}

impl UpdateOrderStatusRequest {
    /// Status to store: the requested one, or `assigned` when only a driver is given.
    pub fn effective_status(&self) -> Option<OrderStatus> {
        match (self.status, self.driver_id) {
            (Some(status), _) => Some(status),
            (None, Some(_)) => Some(OrderStatus::Assigned),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkStatusRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 ids"))]
    pub ids: Vec<i64>,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_vocabulary_parses() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"picked_up\""
        );
        assert!(serde_json::from_str::<OrderStatus>("\"teleported\"").is_err());
    }

    #[test]
    fn test_labels_and_terminal_states() {
        assert_eq!(OrderStatus::Delivering.label(), "En livraison");
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_driver_only_update_means_assigned() {
        let req = UpdateOrderStatusRequest {
            status: None,
            driver_id: Some(Uuid::new_v4()),
        };
        assert_eq!(req.effective_status(), Some(OrderStatus::Assigned));
    }

    #[test]
    fn test_explicit_status_wins_over_driver_assignment() {
        let req = UpdateOrderStatusRequest {
            status: Some(OrderStatus::PickedUp),
            driver_id: Some(Uuid::new_v4()),
        };
        assert_eq!(req.effective_status(), Some(OrderStatus::PickedUp));
        assert_eq!(UpdateOrderStatusRequest::default().effective_status(), None);
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: Some(3),
            product_name: "Poulet DG".into(),
            product_price: 1500,
            quantity: 2,
        };
        assert_eq!(item.subtotal(), 3000);
    }

    #[test]
    fn test_checkout_details_require_contact() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"delivery_address": "Rue 12", "customer_name": "", "customer_phone": "97000000"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("customer_name"));
    }
}
