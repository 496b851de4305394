//! Banner repository.

use domain::models::banner::{CreateBannerRequest, UpdateBannerRequest};
use domain::services::CatalogScope;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::BannerEntity;
use crate::metrics::QueryTimer;

const BANNER_SELECT: &str = r#"
    SELECT b.id, b.restaurant_id, r.manager_id AS restaurant_manager_id, b.title, b.subtitle,
           b.image, b.link_type, b.link_id, b.is_active, b.display_order
    FROM banners b
    LEFT JOIN restaurants r ON r.id = b.restaurant_id
"#;

#[derive(Clone)]
pub struct BannerRepository {
    pool: PgPool,
}

impl BannerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Banners visible in the given catalog scope, by display order.
    pub async fn list(&self, scope: CatalogScope) -> Result<Vec<BannerEntity>, sqlx::Error> {
        let (public_only, manager_id): (bool, Option<Uuid>) = match scope {
            CatalogScope::Public => (true, None),
            CatalogScope::ManagedBy(id) => (false, Some(id)),
            CatalogScope::Everything => (false, None),
        };

        let timer = QueryTimer::new("list_banners");
        let sql = format!(
            "{} WHERE (NOT $1 OR b.is_active)
                AND ($2::UUID IS NULL OR r.manager_id = $2)
              ORDER BY b.display_order, b.id",
            BANNER_SELECT
        );
        let result = sqlx::query_as::<_, BannerEntity>(&sql)
            .bind(public_only)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<BannerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_banner_by_id");
        let sql = format!("{} WHERE b.id = $1", BANNER_SELECT);
        let result = sqlx::query_as::<_, BannerEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Insert a banner. Returns its id.
    pub async fn create(
        &self,
        restaurant_id: Option<i64>,
        request: &CreateBannerRequest,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("create_banner");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO banners (restaurant_id, title, subtitle, link_type, link_id, is_active,
                                 display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(restaurant_id)
        .bind(request.title.trim())
        .bind(&request.subtitle)
        .bind(&request.link_type)
        .bind(request.link_id)
        .bind(request.is_active)
        .bind(request.order)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(&self, id: i64, request: &UpdateBannerRequest) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_banner");
        let result = sqlx::query(
            r#"
            UPDATE banners
            SET title = COALESCE($2, title),
                subtitle = COALESCE($3, subtitle),
                link_type = COALESCE($4, link_type),
                link_id = COALESCE($5, link_id),
                is_active = COALESCE($6, is_active),
                display_order = COALESCE($7, display_order)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.subtitle.as_deref())
        .bind(request.link_type.as_deref())
        .bind(request.link_id)
        .bind(request.is_active)
        .bind(request.order)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_banner");
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
