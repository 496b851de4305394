//! Registration, login and refresh-token sessions.

use chrono::Utc;
use domain::models::restaurant::Restaurant;
use domain::models::user::{RegisterRequest, TokenResponse, User};
use persistence::repositories::{AccountConflict, SessionRepository, UserRepository};
use shared::crypto::sha256_hex;
use shared::jwt::{JwtConfig, JwtError, TokenType};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A user with that username already exists")]
    UsernameTaken,

    #[error("A user with that email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    UserDisabled,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AccountConflict> for AuthError {
    fn from(conflict: AccountConflict) -> Self {
        match conflict {
            AccountConflict::Username => AuthError::UsernameTaken,
            AccountConflict::Email => AuthError::EmailTaken,
        }
    }
}

/// A freshly created account with its first session.
#[derive(Debug)]
pub struct Registration {
    pub user: User,
    pub restaurant: Option<Restaurant>,
    pub tokens: TokenResponse,
}

pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            jwt,
        }
    }

    /// Creates the user, their cart and (for managers) their restaurant, then
    /// opens a session.
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, AuthError> {
        let email = request.email.trim().to_lowercase();
        if let Some(conflict) = self
            .users
            .find_conflict(Some(&request.username), Some(&email), None)
            .await?
        {
            return Err(conflict.into());
        }

        let password_hash = hash_password(&request.password)?;
        let (new_user, signup) = request.into_new_user(password_hash);
        let (user, restaurant) = self
            .users
            .create_account(&new_user, signup.as_ref())
            .await?;
        let user: User = user.into();
        let restaurant: Option<Restaurant> = restaurant.map(Into::into);

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            restaurant_id = restaurant.as_ref().map(|r| r.id),
            "User registered"
        );

        let tokens = self.open_session(user.id).await?;
        Ok(Registration {
            user,
            restaurant,
            tokens,
        })
    }

    /// `login` is matched against the email (case-insensitive) or the username.
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, TokenResponse), AuthError> {
        let user: User = self
            .users
            .find_by_login(login.trim())
            .await?
            .map(Into::into)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let now = Utc::now();
        self.users.update_last_login(user.id, now).await?;
        let tokens = self.open_session(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((
            User {
                last_login_at: Some(now),
                ..user
            },
            tokens,
        ))
    }

    /// Swaps a valid refresh token for a new pair. The presented token stops
    /// working.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt
            .validate(refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let pair = self.jwt.issue_pair(user_id)?;
        self.sessions
            .rotate(
                &sha256_hex(refresh_token),
                &sha256_hex(&pair.refresh.token),
                pair.refresh.expires_at,
            )
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        Ok(self.token_response(pair.access.token, pair.refresh.token))
    }

    /// Best effort: unknown or malformed tokens are ignored.
    pub async fn logout(&self, refresh_token: Option<&str>) {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return;
        };
        match self.sessions.delete_by_hash(&sha256_hex(token)).await {
            Ok(true) => tracing::debug!("Session revoked"),
            Ok(false) => tracing::debug!("Logout for unknown session"),
            Err(e) => tracing::warn!("Failed to revoke session: {}", e),
        }
    }

    async fn open_session(&self, user_id: Uuid) -> Result<TokenResponse, AuthError> {
        let pair = self.jwt.issue_pair(user_id)?;

        let pruned = self.sessions.delete_expired_for_user(user_id).await?;
        if pruned > 0 {
            tracing::debug!(user_id = %user_id, pruned, "Pruned expired sessions");
        }
        self.sessions
            .create(
                user_id,
                &sha256_hex(&pair.refresh.token),
                pair.refresh.expires_at,
            )
            .await?;

        Ok(self.token_response(pair.access.token, pair.refresh.token))
    }

    fn token_response(&self, access: String, refresh: String) -> TokenResponse {
        TokenResponse {
            access,
            refresh,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_mapping() {
        assert!(matches!(
            AuthError::from(AccountConflict::Username),
            AuthError::UsernameTaken
        ));
        assert!(matches!(
            AuthError::from(AccountConflict::Email),
            AuthError::EmailTaken
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(AuthError::UserDisabled.to_string(), "User account is disabled");
    }
}
