//! User and session entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::user::UserSession;
use domain::models::{Role, User};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub avatar: Option<String>,
    pub is_available: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            password_hash: entity.password_hash,
            first_name: entity.first_name,
            last_name: entity.last_name,
            role: entity.role.parse().unwrap_or(Role::Client),
            phone: entity.phone,
            address: entity.address,
            avatar: entity.avatar,
            is_available: entity.is_available,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Database row mapping for the user_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<UserSessionEntity> for UserSession {
    fn from(entity: UserSessionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            refresh_token_hash: entity.refresh_token_hash,
            expires_at: entity.expires_at,
            created_at: entity.created_at,
            last_used_at: entity.last_used_at,
        }
    }
}
