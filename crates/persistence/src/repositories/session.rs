//! Refresh-token session repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserSessionEntity;
use crate::metrics::QueryTimer;

/// Repository for refresh-token sessions. Tokens are stored as SHA-256 hashes.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a session for a newly issued refresh token.
    pub async fn create(
        &self,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an unexpired session by refresh token hash.
    pub async fn find_active(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            SELECT id, user_id, refresh_token_hash, expires_at, created_at, last_used_at
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(refresh_token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Swap the stored refresh hash in one statement.
    ///
    /// Returns `None` when the old hash is unknown or expired, so a refresh
    /// token can be rotated at most once.
    pub async fn rotate(
        &self,
        old_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("rotate_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            UPDATE user_sessions
            SET refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE refresh_token_hash = $1 AND expires_at > NOW()
            RETURNING id, user_id, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(old_hash)
        .bind(new_hash)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Revoke a session. Returns false when nothing matched.
    pub async fn delete_by_hash(&self, refresh_token_hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_session");
        let result = sqlx::query("DELETE FROM user_sessions WHERE refresh_token_hash = $1")
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Drop a user's expired sessions.
    pub async fn delete_expired_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_sessions");
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND expires_at <= NOW()")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
