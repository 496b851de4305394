//! Food category routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::category::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use domain::models::Category;
use domain::services::{authorize, Action, Resource};
use persistence::repositories::CategoryRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser, OptionalUser};

fn not_found() -> ApiError {
    ApiError::NotFound("Category not found".to_string())
}

/// Active categories, by display order then name.
///
/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = CategoryRepository::new(state.pool.clone())
        .list_active()
        .await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| Category::from(c).to_response(state.media_base_url()))
            .collect(),
    ))
}

/// Inactive categories are only visible to admins.
///
/// GET /api/v1/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category: Category = CategoryRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    let is_admin = user.caller().is_some_and(|c| c.is_admin());
    if !category.is_active && !is_admin {
        return Err(not_found());
    }

    Ok(Json(category.to_response(state.media_base_url())))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    authorize(Some(&user.caller()), Action::Create, Resource::Category)?;
    request.validate()?;

    let category: Category = CategoryRepository::new(state.pool.clone())
        .create(&request)
        .await?
        .into();

    info!(category_id = category.id, name = %category.name, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(category.to_response(state.media_base_url())),
    ))
}

/// PUT|PATCH /api/v1/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    authorize(Some(&user.caller()), Action::Update, Resource::Category)?;
    request.validate()?;

    let category: Category = CategoryRepository::new(state.pool.clone())
        .update(id, &request)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    info!(category_id = id, "Category updated");
    Ok(Json(category.to_response(state.media_base_url())))
}

/// DELETE /api/v1/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(Some(&user.caller()), Action::Delete, Resource::Category)?;

    if !CategoryRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
