//! Food categories used to tag restaurants and products.

use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use validator::Validate;

use super::media_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
}

impl Category {
    pub fn to_response(&self, media_base_url: &str) -> CategoryResponse {
        CategoryResponse {
            id: self.id,
            name: self.name.clone(),
            icon: self.icon.clone(),
            image_url: media_url(media_base_url, self.image.as_deref()),
            is_active: self.is_active,
            order: self.display_order,
            filter: self.name.to_lowercase(),
            emoji: emoji_for(&self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub order: i32,
    /// Lowercased name used by clients as a filter key
    pub filter: String,
    pub emoji: &'static str,
}

/// Emoji shown next to a category, keyed by lowercased name (French or English).
pub fn emoji_for(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "pizza" => "🍕",
        "burger" | "burgers" => "🍔",
        "sushi" => "🍣",
        "poulet" | "chicken" => "🍗",
        "africain" | "african" => "🍲",
        "dessert" | "desserts" => "🍰",
        "boissons" | "drinks" => "🥤",
        "salades" | "salads" => "🥗",
        "poisson" | "fish" => "🐟",
        "pâtes" | "pasta" => "🍝",
        "grillades" | "grill" => "🥩",
        _ => "🍽️",
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub icon: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_lookup_is_case_insensitive() {
        assert_eq!(emoji_for("Pizza"), "🍕");
        assert_eq!(emoji_for("GRILLADES"), "🥩");
        assert_eq!(emoji_for("Pâtes"), "🍝");
        assert_eq!(emoji_for("Vegan"), "🍽️");
    }

    #[test]
    fn test_response_derives_filter() {
        let category = Category {
            id: 3,
            name: "Boissons".into(),
            icon: "cup".into(),
            image: None,
            is_active: true,
            display_order: 2,
        };
        let response = category.to_response("http://media");
        assert_eq!(response.filter, "boissons");
        assert_eq!(response.emoji, "🥤");
        assert_eq!(response.order, 2);
        assert!(response.image_url.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let req = CreateCategoryRequest {
            name: "  ".into(),
            icon: String::new(),
            is_active: true,
            order: 0,
        };
        assert!(req.validate().is_err());
    }
}
