//! Category entities (database row mappings).

use domain::models::Category;
use sqlx::FromRow;

/// Database row mapping for the categories table.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryEntity {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
}

impl From<CategoryEntity> for Category {
    fn from(entity: CategoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            icon: entity.icon,
            image: entity.image,
            is_active: entity.is_active,
            display_order: entity.display_order,
        }
    }
}

/// A category linked to a restaurant through restaurant_categories.
#[derive(Debug, Clone, FromRow)]
pub struct RestaurantCategoryEntity {
    pub restaurant_id: i64,
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
}

impl From<RestaurantCategoryEntity> for Category {
    fn from(entity: RestaurantCategoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            icon: entity.icon,
            image: entity.image,
            is_active: entity.is_active,
            display_order: entity.display_order,
        }
    }
}
