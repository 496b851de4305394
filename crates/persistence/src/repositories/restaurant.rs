//! Restaurant repository.

use domain::models::restaurant::{NewRestaurant, UpdateRestaurantRequest};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::RestaurantEntity;
use crate::metrics::QueryTimer;

/// Insert a restaurant on an existing connection or transaction.
pub(crate) async fn insert_restaurant(
    conn: &mut PgConnection,
    new: &NewRestaurant,
) -> Result<RestaurantEntity, sqlx::Error> {
    sqlx::query_as::<_, RestaurantEntity>(
        r#"
        INSERT INTO restaurants (name, description, address, phone, rating, delivery_time,
                                 delivery_fee, minimum_order, is_open, is_active, manager_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, name, description, image, cover_image, address, phone, rating, rating_count,
                  delivery_time, delivery_fee, minimum_order, is_open, is_active, manager_id,
                  created_at
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.address)
    .bind(&new.phone)
    .bind(new.rating)
    .bind(&new.delivery_time)
    .bind(new.delivery_fee)
    .bind(new.minimum_order)
    .bind(new.is_open)
    .bind(new.is_active)
    .bind(new.manager_id)
    .fetch_one(conn)
    .await
}

async fn replace_categories(
    conn: &mut PgConnection,
    restaurant_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM restaurant_categories WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO restaurant_categories (restaurant_id, category_id)
        SELECT $1, c.id FROM categories c WHERE c.id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(restaurant_id)
    .bind(category_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active restaurants.
    pub async fn list_active(&self) -> Result<Vec<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_restaurants");
        let result = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            SELECT id, name, description, image, cover_image, address, phone, rating, rating_count,
                   delivery_time, delivery_fee, minimum_order, is_open, is_active, manager_id,
                   created_at
            FROM restaurants
            WHERE is_active = true
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a restaurant by ID, active or not.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_restaurant_by_id");
        let result = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            SELECT id, name, description, image, cover_image, address, phone, rating, rating_count,
                   delivery_time, delivery_fee, minimum_order, is_open, is_active, manager_id,
                   created_at
            FROM restaurants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The first restaurant a manager runs.
    pub async fn find_by_manager(
        &self,
        manager_id: Uuid,
    ) -> Result<Option<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_restaurant_by_manager");
        let result = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            SELECT id, name, description, image, cover_image, address, phone, rating, rating_count,
                   delivery_time, delivery_fee, minimum_order, is_open, is_active, manager_id,
                   created_at
            FROM restaurants
            WHERE manager_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active restaurants linked to a category.
    pub async fn list_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_restaurants_by_category");
        let result = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            SELECT r.id, r.name, r.description, r.image, r.cover_image, r.address, r.phone,
                   r.rating, r.rating_count, r.delivery_time, r.delivery_fee, r.minimum_order,
                   r.is_open, r.is_active, r.manager_id, r.created_at
            FROM restaurants r
            JOIN restaurant_categories rc ON rc.restaurant_id = r.id
            WHERE rc.category_id = $1 AND r.is_active = true
            ORDER BY r.id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Best-rated active restaurants.
    pub async fn list_featured(
        &self,
        min_rating: Decimal,
        limit: i64,
    ) -> Result<Vec<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_featured_restaurants");
        let result = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            SELECT id, name, description, image, cover_image, address, phone, rating, rating_count,
                   delivery_time, delivery_fee, minimum_order, is_open, is_active, manager_id,
                   created_at
            FROM restaurants
            WHERE is_active = true AND rating >= $1
            ORDER BY rating DESC, id
            LIMIT $2
            "#,
        )
        .bind(min_rating)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a restaurant and link its categories. Unknown category ids are ignored.
    pub async fn create(
        &self,
        new: &NewRestaurant,
        category_ids: &[i64],
    ) -> Result<RestaurantEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_restaurant");
        let mut tx = self.pool.begin().await?;

        let restaurant = insert_restaurant(&mut *tx, new).await?;
        if !category_ids.is_empty() {
            replace_categories(&mut *tx, restaurant.id, category_ids).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(restaurant)
    }

    /// Partial update. `category_ids`, when given, replaces the links.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateRestaurantRequest,
    ) -> Result<Option<RestaurantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_restaurant");
        let mut tx = self.pool.begin().await?;

        let restaurant = sqlx::query_as::<_, RestaurantEntity>(
            r#"
            UPDATE restaurants
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                rating = COALESCE($6, rating),
                delivery_time = COALESCE($7, delivery_time),
                delivery_fee = COALESCE($8, delivery_fee),
                minimum_order = COALESCE($9, minimum_order),
                is_open = COALESCE($10, is_open),
                is_active = COALESCE($11, is_active),
                manager_id = CASE WHEN $12 THEN $13 ELSE manager_id END
            WHERE id = $1
            RETURNING id, name, description, image, cover_image, address, phone, rating,
                      rating_count, delivery_time, delivery_fee, minimum_order, is_open, is_active,
                      manager_id, created_at
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.description.as_deref())
        .bind(request.address.as_deref())
        .bind(request.phone.as_deref())
        .bind(request.rating)
        .bind(request.delivery_time.as_deref())
        .bind(request.delivery_fee)
        .bind(request.minimum_order)
        .bind(request.is_open)
        .bind(request.is_active)
        .bind(request.manager_id.is_some())
        .bind(request.manager_id.flatten())
        .fetch_optional(&mut *tx)
        .await?;

        if let (Some(restaurant), Some(category_ids)) = (&restaurant, &request.category_ids) {
            replace_categories(&mut *tx, restaurant.id, category_ids).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(restaurant)
    }

    /// Flip `is_open`, returning the new value.
    pub async fn toggle_open(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_restaurant_open");
        let result = sqlx::query_scalar::<_, bool>(
            "UPDATE restaurants SET is_open = NOT is_open WHERE id = $1 RETURNING is_open",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn set_image(&self, id: i64, path: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_restaurant_image");
        let result = sqlx::query("UPDATE restaurants SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn bulk_set_open(&self, ids: &[i64], is_open: bool) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_set_restaurant_open");
        let result = sqlx::query("UPDATE restaurants SET is_open = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(is_open)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_restaurant");
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
