//! Restaurant routes.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::category::CategoryResponse;
use domain::models::restaurant::{
    featured_min_rating, ByCategoryQuery, CreateRestaurantRequest, RestaurantDetail,
    RestaurantSummary, ToggleOpenResponse, UpdateRestaurantRequest, FEATURED_RESTAURANT_LIMIT,
};
use domain::models::{Category, Product, Restaurant, Role};
use domain::services::{authorize, Action, Caller, Resource};
use persistence::repositories::{
    CategoryRepository, ProductRepository, RestaurantRepository, UserRepository,
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser, OptionalUser};

use super::store_image;

fn not_found() -> ApiError {
    ApiError::NotFound("Restaurant not found".to_string())
}

pub(crate) async fn load_restaurant(state: &AppState, id: i64) -> Result<Restaurant, ApiError> {
    RestaurantRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)
}

/// Builds listing cards with each restaurant's linked categories.
pub(crate) async fn summaries(
    state: &AppState,
    restaurants: Vec<Restaurant>,
) -> Result<Vec<RestaurantSummary>, ApiError> {
    let ids: Vec<i64> = restaurants.iter().map(|r| r.id).collect();
    let mut categories = categories_by_restaurant(state, &ids).await?;

    Ok(restaurants
        .iter()
        .map(|r| {
            let linked = categories.remove(&r.id).unwrap_or_default();
            r.to_summary(linked, state.media_base_url())
        })
        .collect())
}

async fn categories_by_restaurant(
    state: &AppState,
    restaurant_ids: &[i64],
) -> Result<HashMap<i64, Vec<CategoryResponse>>, ApiError> {
    let links = CategoryRepository::new(state.pool.clone())
        .list_for_restaurants(restaurant_ids)
        .await?;

    let mut grouped: HashMap<i64, Vec<CategoryResponse>> = HashMap::new();
    for link in links {
        let restaurant_id = link.restaurant_id;
        grouped
            .entry(restaurant_id)
            .or_default()
            .push(Category::from(link).to_response(state.media_base_url()));
    }
    Ok(grouped)
}

/// Detail view: the card plus phone and every product of the restaurant.
pub(crate) async fn restaurant_detail(
    state: &AppState,
    restaurant: &Restaurant,
) -> Result<RestaurantDetail, ApiError> {
    let categories = categories_by_restaurant(state, &[restaurant.id])
        .await?
        .remove(&restaurant.id)
        .unwrap_or_default();
    let products = ProductRepository::new(state.pool.clone())
        .list_for_restaurant(restaurant.id)
        .await?
        .into_iter()
        .map(|p| Product::from(p).to_response(state.media_base_url()))
        .collect();

    Ok(restaurant.to_detail(categories, products, state.media_base_url()))
}

async fn summary(state: &AppState, restaurant: Restaurant) -> Result<RestaurantSummary, ApiError> {
    summaries(state, vec![restaurant])
        .await?
        .pop()
        .ok_or_else(not_found)
}

/// A restaurant can only be handed to a manager account.
async fn ensure_manager(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?;
    match user {
        Some(u) if u.role == Role::Manager.as_str() => Ok(()),
        Some(_) => Err(ApiError::field("manager_id", "User is not a manager")),
        None => Err(ApiError::field("manager_id", "User not found")),
    }
}

/// Restaurant that a new product, banner or team member is attached to.
///
/// Managers always work on their own restaurant. Admins name one with
/// `restaurant_id`, which is mandatory when `required` is set.
pub(crate) async fn owning_restaurant(
    state: &AppState,
    caller: &Caller,
    requested: Option<i64>,
    required: bool,
) -> Result<Option<Restaurant>, ApiError> {
    let repo = RestaurantRepository::new(state.pool.clone());
    match caller.role {
        Role::Admin => match requested {
            Some(id) => repo
                .find_by_id(id)
                .await?
                .map(|r| Some(r.into()))
                .ok_or_else(|| ApiError::field("restaurant_id", "Restaurant not found")),
            None if required => Err(ApiError::field(
                "restaurant_id",
                "This field is required",
            )),
            None => Ok(None),
        },
        Role::Manager => repo
            .find_by_manager(caller.user_id)
            .await?
            .map(|r| Some(r.into()))
            .ok_or_else(|| ApiError::Validation("No restaurant found".to_string())),
        Role::Client | Role::Driver => Err(ApiError::Forbidden("Not authorized".to_string())),
    }
}

/// Deactivated restaurants stay reachable for admins and their own manager.
fn visible_to(restaurant: &Restaurant, caller: Option<&Caller>) -> bool {
    restaurant.is_active
        || caller.is_some_and(|c| {
            c.is_admin() || (c.role == Role::Manager && restaurant.manager_id == Some(c.user_id))
        })
}

/// GET /api/v1/restaurants
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantSummary>>, ApiError> {
    let restaurants: Vec<Restaurant> = RestaurantRepository::new(state.pool.clone())
        .list_active()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(summaries(&state, restaurants).await?))
}

/// GET /api/v1/restaurants/:id
pub async fn get_restaurant(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantDetail>, ApiError> {
    let restaurant = load_restaurant(&state, id).await?;
    if !visible_to(&restaurant, user.caller().as_ref()) {
        return Err(not_found());
    }

    Ok(Json(restaurant_detail(&state, &restaurant).await?))
}

/// Active restaurants linked to a category; empty without `category_id`.
///
/// GET /api/v1/restaurants/by_category?category_id=
pub async fn restaurants_by_category(
    State(state): State<AppState>,
    Query(query): Query<ByCategoryQuery>,
) -> Result<Json<Vec<RestaurantSummary>>, ApiError> {
    let Some(category_id) = query.category_id else {
        return Ok(Json(Vec::new()));
    };

    let restaurants: Vec<Restaurant> = RestaurantRepository::new(state.pool.clone())
        .list_by_category(category_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(summaries(&state, restaurants).await?))
}

/// GET /api/v1/restaurants/featured
pub async fn featured_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantSummary>>, ApiError> {
    let restaurants: Vec<Restaurant> = RestaurantRepository::new(state.pool.clone())
        .list_featured(featured_min_rating(), FEATURED_RESTAURANT_LIMIT)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(summaries(&state, restaurants).await?))
}

/// POST /api/v1/restaurants
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantSummary>), ApiError> {
    authorize(
        Some(&user.caller()),
        Action::Create,
        Resource::Restaurant { manager_id: None },
    )?;
    request.validate()?;
    if let Some(manager_id) = request.manager_id {
        ensure_manager(&state, manager_id).await?;
    }

    let restaurant: Restaurant = RestaurantRepository::new(state.pool.clone())
        .create(&request.to_new_restaurant(), &request.category_ids)
        .await?
        .into();

    info!(
        restaurant_id = restaurant.id,
        name = %restaurant.name,
        created_by = %user.id,
        "Restaurant created"
    );
    Ok((StatusCode::CREATED, Json(summary(&state, restaurant).await?)))
}

/// Partial update by an admin or the restaurant's manager.
///
/// PUT|PATCH /api/v1/restaurants/:id
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateRestaurantRequest>,
) -> Result<Json<RestaurantSummary>, ApiError> {
    let caller = user.caller();
    let restaurant = load_restaurant(&state, id).await?;
    authorize(
        Some(&caller),
        Action::Update,
        Resource::Restaurant {
            manager_id: restaurant.manager_id,
        },
    )?;
    if request.touches_admin_fields() && !caller.is_admin() {
        return Err(ApiError::Forbidden(
            "Only administrators can change the manager, rating or active flag".to_string(),
        ));
    }
    request.validate()?;
    if let Some(Some(manager_id)) = request.manager_id {
        ensure_manager(&state, manager_id).await?;
    }

    let updated: Restaurant = RestaurantRepository::new(state.pool.clone())
        .update(id, &request)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    info!(restaurant_id = id, updated_by = %caller.user_id, "Restaurant updated");
    Ok(Json(summary(&state, updated).await?))
}

/// DELETE /api/v1/restaurants/:id
pub async fn delete_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let restaurant = load_restaurant(&state, id).await?;
    authorize(
        Some(&user.caller()),
        Action::Delete,
        Resource::Restaurant {
            manager_id: restaurant.manager_id,
        },
    )?;

    if !RestaurantRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(restaurant_id = id, deleted_by = %user.id, "Restaurant deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/restaurants/:id/toggle_open
pub async fn toggle_open(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ToggleOpenResponse>, ApiError> {
    let restaurant = load_restaurant(&state, id).await?;
    authorize(
        Some(&user.caller()),
        Action::Update,
        Resource::Restaurant {
            manager_id: restaurant.manager_id,
        },
    )?;

    let is_open = RestaurantRepository::new(state.pool.clone())
        .toggle_open(id)
        .await?
        .ok_or_else(not_found)?;

    info!(restaurant_id = id, is_open, "Restaurant open flag toggled");
    Ok(Json(ToggleOpenResponse { is_open }))
}

/// Multipart upload of the restaurant logo (field `image`).
///
/// POST /api/v1/restaurants/:id/upload_image
pub async fn upload_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<RestaurantSummary>, ApiError> {
    let restaurant = load_restaurant(&state, id).await?;
    authorize(
        Some(&user.caller()),
        Action::Update,
        Resource::Restaurant {
            manager_id: restaurant.manager_id,
        },
    )?;

    let path = store_image(&state, "restaurants", multipart).await?;
    if !RestaurantRepository::new(state.pool.clone())
        .set_image(id, &path)
        .await?
    {
        return Err(not_found());
    }

    info!(restaurant_id = id, path = %path, "Restaurant image updated");
    let restaurant = Restaurant {
        image: Some(path),
        ..restaurant
    };
    Ok(Json(summary(&state, restaurant).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn restaurant(is_active: bool, manager_id: Option<Uuid>) -> Restaurant {
        Restaurant {
            id: 1,
            name: "Chez Maman".into(),
            description: String::new(),
            image: None,
            cover_image: None,
            address: "Cotonou".into(),
            phone: "97000000".into(),
            rating: Decimal::ZERO,
            rating_count: 0,
            delivery_time: "30-45 min".into(),
            delivery_fee: 500,
            minimum_order: 1000,
            is_open: true,
            is_active,
            manager_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_restaurant_visible_to_everyone() {
        assert!(visible_to(&restaurant(true, None), None));
    }

    #[test]
    fn test_inactive_restaurant_visibility() {
        let manager = Caller::new(Uuid::new_v4(), Role::Manager);
        let admin = Caller::new(Uuid::new_v4(), Role::Admin);
        let client = Caller::new(Uuid::new_v4(), Role::Client);
        let r = restaurant(false, Some(manager.user_id));

        assert!(!visible_to(&r, None));
        assert!(!visible_to(&r, Some(&client)));
        assert!(visible_to(&r, Some(&manager)));
        assert!(visible_to(&r, Some(&admin)));
        assert!(!visible_to(&r, Some(&Caller::new(Uuid::new_v4(), Role::Manager))));
    }
}
