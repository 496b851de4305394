//! Application settings repository.

use sqlx::PgPool;

use crate::entities::AppSettingEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct AppSettingRepository {
    pool: PgPool,
}

impl AppSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<AppSettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_app_settings");
        let result = sqlx::query_as::<_, AppSettingEntity>(
            "SELECT key, value, description FROM app_settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert or overwrite a setting.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: &str,
    ) -> Result<AppSettingEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_app_setting");
        let result = sqlx::query_as::<_, AppSettingEntity>(
            r#"
            INSERT INTO app_settings (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, description = EXCLUDED.description
            RETURNING key, value, description
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&self, key: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_app_setting");
        let result = sqlx::query("DELETE FROM app_settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
