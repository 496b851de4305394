//! Banner entity (database row mapping).

use domain::models::Banner;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `banners` with the owning restaurant's manager.
#[derive(Debug, Clone, FromRow)]
pub struct BannerEntity {
    pub id: i64,
    pub restaurant_id: Option<i64>,
    pub restaurant_manager_id: Option<Uuid>,
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    pub link_type: String,
    pub link_id: Option<i64>,
    pub is_active: bool,
    pub display_order: i32,
}

impl From<BannerEntity> for Banner {
    fn from(entity: BannerEntity) -> Self {
        Self {
            id: entity.id,
            restaurant_id: entity.restaurant_id,
            restaurant_manager_id: entity.restaurant_manager_id,
            title: entity.title,
            subtitle: entity.subtitle,
            image: entity.image,
            link_type: entity.link_type,
            link_id: entity.link_id,
            is_active: entity.is_active,
            display_order: entity.display_order,
        }
    }
}
