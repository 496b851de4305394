//! Product repository. Every read joins the restaurant and category names.

use domain::models::product::{BulkProductFlagsRequest, NewProduct, UpdateProductRequest};
use domain::services::CatalogScope;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProductEntity;
use crate::metrics::QueryTimer;

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.restaurant_id, r.name AS restaurant_name, r.manager_id AS restaurant_manager_id,
           r.is_active AS restaurant_is_active, p.category_id, c.name AS category_name,
           p.name, p.description, p.price, p.image,
           p.is_available, p.is_popular, p.is_featured, p.created_at
    FROM products p
    JOIN restaurants r ON r.id = p.restaurant_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Products visible in the given catalog scope.
    pub async fn list(&self, scope: CatalogScope) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let (public_only, manager_id): (bool, Option<Uuid>) = match scope {
            CatalogScope::Public => (true, None),
            CatalogScope::ManagedBy(id) => (false, Some(id)),
            CatalogScope::Everything => (false, None),
        };

        let timer = QueryTimer::new("list_products");
        let sql = format!(
            "{} WHERE (NOT $1 OR (p.is_available AND r.is_active))
                AND ($2::UUID IS NULL OR r.manager_id = $2)
              ORDER BY p.id",
            PRODUCT_SELECT
        );
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(public_only)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_product_by_id");
        let sql = format!("{} WHERE p.id = $1", PRODUCT_SELECT);
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Every product of a restaurant, available or not.
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_products_for_restaurant");
        let sql = format!("{} WHERE p.restaurant_id = $1 ORDER BY p.id", PRODUCT_SELECT);
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Available products of a restaurant, empty when the restaurant is inactive.
    pub async fn list_available_for_restaurant(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_available_products_for_restaurant");
        let sql = format!(
            "{} WHERE p.restaurant_id = $1 AND p.is_available AND r.is_active ORDER BY p.id",
            PRODUCT_SELECT
        );
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Public products flagged popular.
    pub async fn list_popular(&self, limit: i64) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_popular_products");
        let sql = format!(
            "{} WHERE p.is_available AND r.is_active AND p.is_popular ORDER BY p.id LIMIT $1",
            PRODUCT_SELECT
        );
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Public products flagged featured.
    pub async fn list_featured(&self, limit: i64) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_featured_products");
        let sql = format!(
            "{} WHERE p.is_available AND r.is_active AND p.is_featured ORDER BY p.id LIMIT $1",
            PRODUCT_SELECT
        );
        let result = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn create(&self, new: &NewProduct) -> Result<ProductEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_product");
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (restaurant_id, category_id, name, description, price,
                                  is_available, is_popular, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(new.restaurant_id)
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.is_available)
        .bind(new.is_popular)
        .bind(new.is_featured)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!("{} WHERE p.id = $1", PRODUCT_SELECT);
        let product = sqlx::query_as::<_, ProductEntity>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(product)
    }

    /// Partial update. Returns false when the product does not exist.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateProductRequest,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_product");
        let result = sqlx::query(
            r#"
            UPDATE products
            SET category_id = CASE WHEN $2 THEN $3 ELSE category_id END,
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                price = COALESCE($6, price),
                is_available = COALESCE($7, is_available),
                is_popular = COALESCE($8, is_popular),
                is_featured = COALESCE($9, is_featured)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.category_id.is_some())
        .bind(request.category_id.flatten())
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.description.as_deref())
        .bind(request.price)
        .bind(request.is_available)
        .bind(request.is_popular)
        .bind(request.is_featured)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_image(&self, id: i64, path: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_product_image");
        let result = sqlx::query("UPDATE products SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Apply the set flags to every listed product.
    pub async fn bulk_set_flags(
        &self,
        request: &BulkProductFlagsRequest,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_set_product_flags");
        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_available = COALESCE($2, is_available),
                is_popular = COALESCE($3, is_popular),
                is_featured = COALESCE($4, is_featured)
            WHERE id = ANY($1)
            "#,
        )
        .bind(&request.ids)
        .bind(request.is_available)
        .bind(request.is_popular)
        .bind(request.is_featured)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_product");
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
