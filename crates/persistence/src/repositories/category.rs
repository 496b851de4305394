//! Category repository.

use domain::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use sqlx::PgPool;

use crate::entities::{CategoryEntity, RestaurantCategoryEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active categories by display order, then name.
    pub async fn list_active(&self) -> Result<Vec<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_categories");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            SELECT id, name, icon, image, is_active, display_order
            FROM categories
            WHERE is_active = true
            ORDER BY display_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_category_by_id");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            SELECT id, name, icon, image, is_active, display_order
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Categories linked to any of the given restaurants.
    pub async fn list_for_restaurants(
        &self,
        restaurant_ids: &[i64],
    ) -> Result<Vec<RestaurantCategoryEntity>, sqlx::Error> {
        if restaurant_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_categories_for_restaurants");
        let result = sqlx::query_as::<_, RestaurantCategoryEntity>(
            r#"
            SELECT rc.restaurant_id, c.id, c.name, c.icon, c.image, c.is_active, c.display_order
            FROM restaurant_categories rc
            JOIN categories c ON c.id = rc.category_id
            WHERE rc.restaurant_id = ANY($1)
            ORDER BY rc.restaurant_id, c.display_order, c.name
            "#,
        )
        .bind(restaurant_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_category");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            INSERT INTO categories (name, icon, is_active, display_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, icon, image, is_active, display_order
            "#,
        )
        .bind(request.name.trim())
        .bind(&request.icon)
        .bind(request.is_active)
        .bind(request.order)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateCategoryRequest,
    ) -> Result<Option<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_category");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                is_active = COALESCE($4, is_active),
                display_order = COALESCE($5, display_order)
            WHERE id = $1
            RETURNING id, name, icon, image, is_active, display_order
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.icon.as_deref())
        .bind(request.is_active)
        .bind(request.order)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_category");
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
