//! Promotional banners shown on the home screen.

use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use uuid::Uuid;
use validator::Validate;

use super::media_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    /// `None` for platform-wide banners
    pub restaurant_id: Option<i64>,
    pub restaurant_manager_id: Option<Uuid>,
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    /// What tapping the banner opens (e.g. `restaurant`, `product`)
    pub link_type: String,
    pub link_id: Option<i64>,
    pub is_active: bool,
    pub display_order: i32,
}

impl Banner {
    pub fn to_response(&self, media_base_url: &str) -> BannerResponse {
        BannerResponse {
            id: self.id,
            restaurant: self.restaurant_id,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            image_url: media_url(media_base_url, self.image.as_deref()),
            link_type: self.link_type.clone(),
            link_id: self.link_id,
            is_active: self.is_active,
            order: self.display_order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerResponse {
    pub id: i64,
    pub restaurant: Option<i64>,
    pub title: String,
    pub subtitle: String,
    pub image_url: Option<String>,
    pub link_type: String,
    pub link_id: Option<i64>,
    pub is_active: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBannerRequest {
    /// Admins only; managers always post for their own restaurant.
    pub restaurant_id: Option<i64>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub subtitle: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub link_type: String,
    pub link_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBannerRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 300))]
    pub subtitle: Option<String>,
    #[validate(length(max = 50))]
    pub link_type: Option<String>,
    pub link_id: Option<i64>,
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
    fn test_create_defaults() {
        let req: CreateBannerRequest = serde_json::from_str(r#"{"title": "-20% ce soir"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.is_active);
        assert_eq!(req.order, 0);
        assert!(req.restaurant_id.is_none());
    }

    #[test]
    fn test_response_maps_order() {
        let banner = Banner {
            id: 2,
            restaurant_id: Some(5),
            restaurant_manager_id: None,
            title: "Nouveau".into(),
            subtitle: String::new(),
            image: Some("banners/b.png".into()),
            link_type: "restaurant".into(),
            link_id: Some(5),
            is_active: true,
            display_order: 4,
        };
        let response = banner.to_response("http://m");
        assert_eq!(response.order, 4);
        assert_eq!(response.image_url.as_deref(), Some("http://m/banners/b.png"));
    }
}
