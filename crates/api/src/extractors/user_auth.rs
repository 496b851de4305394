//! Authenticated-user extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::User;
use domain::services::Caller;
use std::ops::Deref;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{authenticate, bearer_token, AuthenticatedUser};

/// The authenticated, active user behind the request.
///
/// Reuses the result of `require_user_auth` when the route is behind it,
/// otherwise validates the bearer token itself.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl CurrentUser {
    pub fn caller(&self) -> Caller {
        self.0.caller()
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0.user
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(CurrentUser(auth.clone()));
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;
        let auth = authenticate(state, token).await?;
        Ok(CurrentUser(auth))
    }
}

/// Caller of a public endpoint, if a valid token was sent.
///
/// Invalid or stale tokens are treated as anonymous.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl OptionalUser {
    pub fn caller(&self) -> Option<Caller> {
        self.0.as_ref().map(CurrentUser::caller)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(ApiError::Unauthorized(_)) => Ok(OptionalUser(None)),
            Err(e) => Err(e),
        }
    }
}
