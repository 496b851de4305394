//! Bearer-token authentication.
//!
//! The access token only proves identity; the user row is reloaded on every
//! request so that disabled accounts and role changes apply immediately.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::User;
use domain::services::Caller;
use persistence::repositories::UserRepository;
use shared::jwt::TokenType;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    /// JWT id of the access token
    pub jti: String,
}

impl AuthenticatedUser {
    pub fn caller(&self) -> Caller {
        Caller::from(&self.user)
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates an access token and loads its (active) user.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, ApiError> {
    let claims = state
        .jwt
        .validate(token, TokenType::Access)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;
    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized("User account is disabled".to_string()));
    }

    Ok(AuthenticatedUser {
        user,
        jti: claims.jti,
    })
}

/// Rejects requests without a valid access token of an active user.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        return ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    match authenticate(&state, &token).await {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
