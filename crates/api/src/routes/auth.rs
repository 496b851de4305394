//! Authentication routes: registration, login, token rotation and the
//! caller's own profile.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use domain::models::user::{
    AuthResponse, LoginRequest, LogoutRequest, LogoutResponse, RefreshRequest, RegisterRequest,
    Role, TokenResponse, UpdateProfileRequest, UserResponse,
};
use domain::models::User;
use persistence::repositories::UserRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::middleware::metrics::record_user_registered;
use crate::services::{AuthError, AuthService};

use super::store_image;

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

/// Register a new account.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let registration = auth_service(&state).register(request).await?;
    record_user_registered(registration.user.role);

    let response = AuthResponse {
        user: registration.user.to_response(state.media_base_url()),
        tokens: registration.tokens,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email (or username) and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let (user, tokens) = auth_service(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user.to_response(state.media_base_url()),
        tokens,
    }))
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(request): AppJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;

    let tokens = auth_service(&state).refresh(&request.refresh).await?;
    Ok(Json(tokens))
}

/// Revoke the session behind a refresh token. Always succeeds.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Option<AppJson<LogoutRequest>>,
) -> Json<LogoutResponse> {
    let refresh = request.and_then(|AppJson(r)| r.refresh);
    auth_service(&state).logout(refresh.as_deref()).await;
    info!(user_id = %user.id, "User logged out");

    Json(LogoutResponse {
        detail: "Logged out successfully",
    })
}

/// GET /api/v1/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<UserResponse> {
    Json(user.to_response(state.media_base_url()))
}

/// Partial update of the caller's own profile.
///
/// PUT|PATCH /api/v1/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(mut request): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;
    request.email = request.email.map(|e| e.trim().to_lowercase());

    // Availability is a driver concept
    if user.role != Role::Driver {
        request.is_available = None;
    }

    let repo = UserRepository::new(state.pool.clone());
    if let Some(conflict) = repo
        .find_conflict(
            request.username.as_deref(),
            request.email.as_deref(),
            Some(user.id),
        )
        .await?
    {
        return Err(AuthError::from(conflict).into());
    }

    let updated: User = repo
        .update_profile(user.id, &request)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %updated.id, "Profile updated");
    Ok(Json(updated.to_response(state.media_base_url())))
}

/// Replace the caller's avatar (multipart field `image`).
///
/// POST /api/v1/auth/profile/avatar
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let path = store_image(&state, "avatars", multipart).await?;

    let updated: User = UserRepository::new(state.pool.clone())
        .set_avatar(user.id, &path)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %updated.id, path = %path, "Avatar updated");
    Ok(Json(updated.to_response(state.media_base_url())))
}
