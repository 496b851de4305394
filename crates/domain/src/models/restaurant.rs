//! Restaurants and their listing/detail representations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_phone};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::category::CategoryResponse;
use super::product::ProductResponse;
use super::media_url;

pub const DEFAULT_DELIVERY_FEE: i64 = 500;
pub const DEFAULT_MINIMUM_ORDER: i64 = 1000;
pub const DEFAULT_DELIVERY_TIME: &str = "30-45 min";
/// Address given to restaurants auto-created for new managers.
pub const DEFAULT_RESTAURANT_ADDRESS: &str = "Cotonou, Bénin";
pub const FEATURED_RESTAURANT_LIMIT: i64 = 10;

/// Restaurants rated at or above this value appear in the featured list.
pub fn featured_min_rating() -> Decimal {
    Decimal::new(40, 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
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

impl Restaurant {
    /// Listing card. `categories` are the restaurant's linked categories.
    pub fn to_summary(
        &self,
        categories: Vec<CategoryResponse>,
        media_base_url: &str,
    ) -> RestaurantSummary {
        RestaurantSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            image_url: media_url(media_base_url, self.image.as_deref()),
            cover_image_url: media_url(media_base_url, self.cover_image.as_deref()),
            address: self.address.clone(),
            rating: self.rating,
            rating_count: self.rating_count,
            delivery_time: self.delivery_time.clone(),
            delivery_fee: self.delivery_fee,
            minimum_order: self.minimum_order,
            is_open: self.is_open,
            is_active: self.is_active,
            manager_id: self.manager_id,
            category: categories.first().map(|c| c.filter.clone()),
            categories,
        }
    }

    pub fn to_detail(
        &self,
        categories: Vec<CategoryResponse>,
        products: Vec<ProductResponse>,
        media_base_url: &str,
    ) -> RestaurantDetail {
        RestaurantDetail {
            summary: self.to_summary(categories, media_base_url),
            phone: self.phone.clone(),
            products,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub address: String,
    pub rating: Decimal,
    pub rating_count: i32,
    pub delivery_time: String,
    pub delivery_fee: i64,
    pub minimum_order: i64,
    pub is_open: bool,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
    pub categories: Vec<CategoryResponse>,
    /// Filter key of the first linked category
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    pub phone: String,
    pub products: Vec<ProductResponse>,
}

/// Values for inserting a restaurant row.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub rating: Decimal,
    pub delivery_time: String,
    pub delivery_fee: i64,
    pub minimum_order: i64,
    pub is_open: bool,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
}

impl NewRestaurant {
    /// Restaurant opened together with a manager account.
    pub fn for_manager(
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        manager_phone: &str,
        manager_id: Uuid,
    ) -> Self {
        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let phone = phone.map(str::trim).filter(|p| !p.is_empty());
        Self {
            name: name.trim().to_string(),
            description: String::new(),
            address: address.unwrap_or(DEFAULT_RESTAURANT_ADDRESS).to_string(),
            phone: phone.unwrap_or(manager_phone).to_string(),
            rating: Decimal::ZERO,
            delivery_time: DEFAULT_DELIVERY_TIME.to_string(),
            delivery_fee: DEFAULT_DELIVERY_FEE,
            minimum_order: DEFAULT_MINIMUM_ORDER,
            is_open: true,
            is_active: true,
            manager_id: Some(manager_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<Decimal>,
    #[validate(length(max = 50))]
    pub delivery_time: Option<String>,
    #[validate(range(min = 0, message = "Delivery fee cannot be negative"))]
    pub delivery_fee: Option<i64>,
    #[validate(range(min = 0, message = "Minimum order cannot be negative"))]
    pub minimum_order: Option<i64>,
    #[serde(default = "default_true")]
    pub is_open: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    pub manager_id: Option<Uuid>,
}

impl CreateRestaurantRequest {
    pub fn to_new_restaurant(&self) -> NewRestaurant {
        NewRestaurant {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            rating: self.rating.unwrap_or(Decimal::ZERO),
            delivery_time: self
                .delivery_time
                .clone()
                .unwrap_or_else(|| DEFAULT_DELIVERY_TIME.to_string()),
            delivery_fee: self.delivery_fee.unwrap_or(DEFAULT_DELIVERY_FEE),
            minimum_order: self.minimum_order.unwrap_or(DEFAULT_MINIMUM_ORDER),
            is_open: self.is_open,
            is_active: self.is_active,
            manager_id: self.manager_id,
        }
    }
}

/// Partial update; PUT and PATCH behave the same.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<Decimal>,
    #[validate(length(max = 50))]
    pub delivery_time: Option<String>,
    #[validate(range(min = 0, message = "Delivery fee cannot be negative"))]
    pub delivery_fee: Option<i64>,
    #[validate(range(min = 0, message = "Minimum order cannot be negative"))]
    pub minimum_order: Option<i64>,
    pub is_open: Option<bool>,
    pub is_active: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
    /// `Some(None)` clears the manager.
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<Uuid>>,
}

impl UpdateRestaurantRequest {
    /// Fields only an administrator may change.
    pub fn touches_admin_fields(&self) -> bool {
        self.manager_id.is_some() || self.is_active.is_some() || self.rating.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ByCategoryQuery {
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOpenResponse {
    pub is_open: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkOpenRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 ids"))]
    pub ids: Vec<i64>,
    pub is_open: bool,
}

fn validate_rating(rating: &Decimal) -> Result<(), ValidationError> {
    if *rating >= Decimal::ZERO && *rating <= Decimal::new(50, 1) {
        Ok(())
    } else {
        let mut err = ValidationError::new("rating_range");
        err.message = Some("Rating must be between 0.0 and 5.0".into());
        Err(err)
    }
}

fn default_true() -> bool {
    true
}

/// Distinguishes an absent field from an explicit `null`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_restaurant_defaults() {
        let manager_id = Uuid::new_v4();
        let new = NewRestaurant::for_manager(" Chez Maman ", None, Some(""), "+22997000000", manager_id);

        assert_eq!(new.name, "Chez Maman");
        assert_eq!(new.address, "Cotonou, Bénin");
        assert_eq!(new.phone, "+22997000000");
        assert_eq!(new.delivery_fee, 500);
        assert_eq!(new.minimum_order, 1000);
        assert!(new.is_open && new.is_active);
        assert_eq!(new.manager_id, Some(manager_id));
    }

    #[test]
    fn test_manager_restaurant_keeps_given_contact() {
        let new = NewRestaurant::for_manager("Maquis", Some("Porto-Novo"), Some("+22961000000"), "", Uuid::new_v4());
        assert_eq!(new.address, "Porto-Novo");
        assert_eq!(new.phone, "+22961000000");
    }

    #[test]
    fn test_update_distinguishes_null_manager() {
        let cleared: UpdateRestaurantRequest =
            serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        assert_eq!(cleared.manager_id, Some(None));
        assert!(cleared.touches_admin_fields());

        let untouched: UpdateRestaurantRequest =
            serde_json::from_str(r#"{"name": "Le Bon Goût"}"#).unwrap();
        assert_eq!(untouched.manager_id, None);
        assert!(!untouched.touches_admin_fields());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(&Decimal::new(45, 1)).is_ok());
        assert!(validate_rating(&Decimal::new(51, 1)).is_err());
        assert!(validate_rating(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_negative_fee_rejected() {
        let req: UpdateRestaurantRequest =
            serde_json::from_str(r#"{"delivery_fee": -1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_summary_uses_first_category_filter() {
        let restaurant = Restaurant {
            id: 1,
            name: "Maquis".into(),
            description: String::new(),
            image: Some("restaurants/m.jpg".into()),
            cover_image: None,
            address: "Cotonou".into(),
            phone: String::new(),
            rating: Decimal::new(42, 1),
            rating_count: 12,
            delivery_time: "30-45 min".into(),
            delivery_fee: 500,
            minimum_order: 1000,
            is_open: true,
            is_active: true,
            manager_id: None,
            created_at: Utc::now(),
        };
        let category = CategoryResponse {
            id: 1,
            name: "Africain".into(),
            icon: String::new(),
            image_url: None,
            is_active: true,
            order: 0,
            filter: "africain".into(),
            emoji: "🍲",
        };
        let summary = restaurant.to_summary(vec![category], "http://m");
        assert_eq!(summary.category.as_deref(), Some("africain"));
        assert_eq!(summary.image_url.as_deref(), Some("http://m/restaurants/m.jpg"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["rating"], serde_json::json!(4.2));
    }
}
