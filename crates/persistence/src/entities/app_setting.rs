//! Application setting entity (database row mapping).

use domain::models::AppSetting;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AppSettingEntity {
    pub key: String,
    pub value: String,
    pub description: String,
}

impl From<AppSettingEntity> for AppSetting {
    fn from(entity: AppSettingEntity) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            description: entity.description,
        }
    }
}
