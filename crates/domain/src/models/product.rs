//! Menu items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use uuid::Uuid;
use validator::Validate;

use super::media_url;
use super::restaurant::double_option;

pub const POPULAR_PRODUCT_LIMIT: i64 = 20;
pub const FEATURED_PRODUCT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    /// Manager of the owning restaurant, used for access decisions
    pub restaurant_manager_id: Option<Uuid>,
    pub restaurant_is_active: bool,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: String,
    /// Minor currency units
    pub price: i64,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_popular: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Shown in the public catalog: available and sold by an active restaurant.
    pub fn is_public(&self) -> bool {
        self.is_available && self.restaurant_is_active
    }

    pub fn to_response(&self, media_base_url: &str) -> ProductResponse {
        ProductResponse {
            id: self.id,
            restaurant: self.restaurant_id,
            restaurant_name: self.restaurant_name.clone(),
            category: self.category_id,
            category_name: self.category_name.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image_url: media_url(media_base_url, self.image.as_deref()),
            is_available: self.is_available,
            is_popular: self.is_popular,
            is_featured: self.is_featured,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub restaurant: i64,
    pub restaurant_name: String,
    pub category: Option<i64>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_popular: bool,
    pub is_featured: bool,
}

/// Values for inserting a product row once the owning restaurant is resolved.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub restaurant_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub is_available: bool,
    pub is_popular: bool,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductRequest {
    /// Ignored for managers, whose own restaurant is always used.
    pub restaurant_id: Option<i64>,
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, max = 100000000, message = "Price must be between 0 and 100000000"))]
    pub price: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl CreateProductRequest {
    pub fn into_new_product(self, restaurant_id: i64) -> NewProduct {
        NewProduct {
            restaurant_id,
            category_id: self.category_id,
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            is_available: self.is_available,
            is_popular: self.is_popular,
            is_featured: self.is_featured,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    /// `Some(None)` detaches the category.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100000000, message = "Price must be between 0 and 100000000"))]
    pub price: Option<i64>,
    pub is_available: Option<bool>,
    pub is_popular: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ByRestaurantQuery {
    pub restaurant_id: Option<i64>,
}

/// Admin bulk toggle of product flags. Unset flags are left alone.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkProductFlagsRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 ids"))]
    pub ids: Vec<i64>,
    pub is_available: Option<bool>,
    pub is_popular: Option<bool>,
    pub is_featured: Option<bool>,
}

impl BulkProductFlagsRequest {
    pub fn is_empty(&self) -> bool {
        self.is_available.is_none() && self.is_popular.is_none() && self.is_featured.is_none()
    }
}

fn default_true() -> bool {
    true
}
