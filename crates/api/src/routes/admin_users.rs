//! Back-office routes: account management and bulk actions.
//!
//! Every handler requires an administrator.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::order::BulkStatusRequest;
use domain::models::product::BulkProductFlagsRequest;
use domain::models::restaurant::BulkOpenRequest;
use domain::models::user::{
    AdminUpdateUserRequest, BulkAvailabilityRequest, CreateUserRequest, UserResponse,
};
use domain::models::{BulkUpdateResponse, Role, User};
use domain::services::{authorize, Action, Resource};
use persistence::entities::UserEntity;
use persistence::repositories::{
    OrderRepository, ProductRepository, RestaurantRepository, UserRepository,
};
use shared::password::hash_password;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::middleware::metrics::{record_order_status_change, record_user_registered};
use crate::services::AuthError;

fn require_admin(user: &CurrentUser, action: Action) -> Result<(), ApiError> {
    authorize(Some(&user.caller()), action, Resource::UserAccount)?;
    Ok(())
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

fn render(state: &AppState, users: Vec<UserEntity>) -> Vec<UserResponse> {
    users
        .into_iter()
        .map(|u| User::from(u).to_response(state.media_base_url()))
        .collect()
}

async fn list_by_role(
    state: &AppState,
    role: Option<Role>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(state.pool.clone()).list(role).await?;
    Ok(Json(render(state, users)))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(&user, Action::View)?;
    list_by_role(&state, None).await
}

/// GET /api/v1/admin/users/drivers
pub async fn list_drivers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(&user, Action::View)?;
    list_by_role(&state, Some(Role::Driver)).await
}

/// GET /api/v1/admin/users/managers
pub async fn list_managers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(&user, Action::View)?;
    list_by_role(&state, Some(Role::Manager)).await
}

/// GET /api/v1/admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&user, Action::View)?;

    let found: User = UserRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    Ok(Json(found.to_response(state.media_base_url())))
}

/// Creates an account of any role, with its cart.
///
/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    require_admin(&user, Action::Create)?;
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let email = request.email.trim().to_lowercase();
    if let Some(conflict) = repo
        .find_conflict(Some(&request.username), Some(&email), None)
        .await?
    {
        return Err(AuthError::from(conflict).into());
    }

    let password_hash = hash_password(&request.password).map_err(AuthError::from)?;
    let (created, _) = repo
        .create_account(&request.into_new_user(password_hash), None)
        .await?;
    let created: User = created.into();

    record_user_registered(created.role);
    info!(
        user_id = %created.id,
        role = %created.role,
        created_by = %user.id,
        "User created by admin"
    );
    Ok((
        StatusCode::CREATED,
        Json(created.to_response(state.media_base_url())),
    ))
}

/// PUT|PATCH /api/v1/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(mut request): AppJson<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&user, Action::Update)?;
    request.validate()?;
    request.email = request.email.map(|e| e.trim().to_lowercase());

    let repo = UserRepository::new(state.pool.clone());
    if let Some(conflict) = repo
        .find_conflict(request.username.as_deref(), request.email.as_deref(), Some(id))
        .await?
    {
        return Err(AuthError::from(conflict).into());
    }

    let password_hash = request
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(AuthError::from)?;

    let updated: User = repo
        .admin_update(id, &request, password_hash.as_deref())
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    info!(
        user_id = %id,
        role = %updated.role,
        is_active = updated.is_active,
        updated_by = %user.id,
        "User updated by admin"
    );
    Ok(Json(updated.to_response(state.media_base_url())))
}

/// DELETE /api/v1/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user, Action::Delete)?;
    if id == user.id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    if !UserRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(user_id = %id, deleted_by = %user.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Sets availability on many drivers; other roles are skipped.
///
/// POST /api/v1/admin/users/bulk_availability
pub async fn bulk_availability(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<BulkAvailabilityRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    require_admin(&user, Action::Update)?;
    request.validate()?;

    let updated = UserRepository::new(state.pool.clone())
        .bulk_set_availability(&request.ids, request.is_available)
        .await?;

    info!(
        requested = request.ids.len(),
        updated,
        is_available = request.is_available,
        "Bulk driver availability"
    );
    Ok(Json(BulkUpdateResponse { updated }))
}

/// POST /api/v1/admin/orders/bulk_status
pub async fn bulk_order_status(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<BulkStatusRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    require_admin(&user, Action::Update)?;
    request.validate()?;

    let updated = OrderRepository::new(state.pool.clone())
        .bulk_set_status(&request.ids, request.status)
        .await?;
    if updated > 0 {
        record_order_status_change(request.status);
    }

    info!(
        requested = request.ids.len(),
        updated,
        status = request.status.as_str(),
        "Bulk order status"
    );
    Ok(Json(BulkUpdateResponse { updated }))
}

/// POST /api/v1/admin/restaurants/bulk_open
pub async fn bulk_restaurants_open(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<BulkOpenRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    require_admin(&user, Action::Update)?;
    request.validate()?;

    let updated = RestaurantRepository::new(state.pool.clone())
        .bulk_set_open(&request.ids, request.is_open)
        .await?;

    info!(
        requested = request.ids.len(),
        updated,
        is_open = request.is_open,
        "Bulk restaurant open flag"
    );
    Ok(Json(BulkUpdateResponse { updated }))
}

/// POST /api/v1/admin/products/bulk_flags
pub async fn bulk_product_flags(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<BulkProductFlagsRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    require_admin(&user, Action::Update)?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation(
            "Provide at least one of is_available, is_popular, is_featured".to_string(),
        ));
    }

    let updated = ProductRepository::new(state.pool.clone())
        .bulk_set_flags(&request)
        .await?;

    info!(requested = request.ids.len(), updated, "Bulk product flags");
    Ok(Json(BulkUpdateResponse { updated }))
}
