//! Home-screen banner routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::banner::{BannerResponse, CreateBannerRequest, UpdateBannerRequest};
use domain::models::Banner;
use domain::services::{authorize, Action, CatalogScope, Resource};
use persistence::repositories::BannerRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser, OptionalUser};

use super::restaurants::owning_restaurant;

fn not_found() -> ApiError {
    ApiError::NotFound("Banner not found".to_string())
}

async fn load_banner(state: &AppState, id: i64) -> Result<Banner, ApiError> {
    BannerRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)
}

fn record_of(banner: &Banner) -> Resource {
    Resource::RestaurantRecord {
        manager_id: banner.restaurant_manager_id,
    }
}

/// GET /api/v1/banners
pub async fn list_banners(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Json<Vec<BannerResponse>>, ApiError> {
    let scope = CatalogScope::for_caller(user.caller().as_ref());
    let banners = BannerRepository::new(state.pool.clone()).list(scope).await?;

    Ok(Json(
        banners
            .into_iter()
            .map(|b| Banner::from(b).to_response(state.media_base_url()))
            .collect(),
    ))
}

/// GET /api/v1/banners/:id
pub async fn get_banner(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Json<BannerResponse>, ApiError> {
    let banner = load_banner(&state, id).await?;
    let caller = user.caller();
    if !banner.is_active && authorize(caller.as_ref(), Action::Update, record_of(&banner)).is_err()
    {
        return Err(not_found());
    }

    Ok(Json(banner.to_response(state.media_base_url())))
}

/// POST /api/v1/banners
pub async fn create_banner(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateBannerRequest>,
) -> Result<(StatusCode, Json<BannerResponse>), ApiError> {
    let caller = user.caller();
    let restaurant = owning_restaurant(&state, &caller, request.restaurant_id, false).await?;
    authorize(
        Some(&caller),
        Action::Create,
        Resource::RestaurantRecord {
            manager_id: restaurant.as_ref().and_then(|r| r.manager_id),
        },
    )?;
    request.validate()?;

    let id = BannerRepository::new(state.pool.clone())
        .create(restaurant.as_ref().map(|r| r.id), &request)
        .await?;

    info!(banner_id = id, created_by = %caller.user_id, "Banner created");
    let banner = load_banner(&state, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(banner.to_response(state.media_base_url())),
    ))
}

/// PUT|PATCH /api/v1/banners/:id
pub async fn update_banner(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateBannerRequest>,
) -> Result<Json<BannerResponse>, ApiError> {
    let banner = load_banner(&state, id).await?;
    authorize(Some(&user.caller()), Action::Update, record_of(&banner))?;
    request.validate()?;

    if !BannerRepository::new(state.pool.clone())
        .update(id, &request)
        .await?
    {
        return Err(not_found());
    }

    info!(banner_id = id, updated_by = %user.id, "Banner updated");
    let banner = load_banner(&state, id).await?;
    Ok(Json(banner.to_response(state.media_base_url())))
}

/// DELETE /api/v1/banners/:id
pub async fn delete_banner(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let banner = load_banner(&state, id).await?;
    authorize(Some(&user.caller()), Action::Delete, record_of(&banner))?;

    if !BannerRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(banner_id = id, deleted_by = %user.id, "Banner deleted");
    Ok(StatusCode::NO_CONTENT)
}
