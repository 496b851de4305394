//! Manager area: dashboard counters and the manager's own restaurant.

use axum::{extract::State, Json};
use domain::models::restaurant::RestaurantDetail;
use domain::models::{ManagerDashboard, Restaurant};
use domain::services::calendar::today_bounds;
use domain::services::{authorize, Action, Resource};
use persistence::repositories::{DashboardRepository, RestaurantRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

use super::restaurants::restaurant_detail;

/// Admins get platform-wide figures.
///
/// GET /api/v1/manager/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ManagerDashboard>, ApiError> {
    let caller = user.caller();
    authorize(Some(&caller), Action::View, Resource::ManagerArea)?;

    let manager_id = (!caller.is_admin()).then_some(caller.user_id);
    let stats = DashboardRepository::new(state.pool.clone())
        .manager_stats(manager_id, today_bounds())
        .await?;

    Ok(Json(stats))
}

/// GET /api/v1/manager/restaurant
pub async fn my_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<RestaurantDetail>, ApiError> {
    authorize(Some(&user.caller()), Action::View, Resource::ManagerArea)?;

    let restaurant: Restaurant = RestaurantRepository::new(state.pool.clone())
        .find_by_manager(user.id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("No restaurant found".to_string()))?;

    Ok(Json(restaurant_detail(&state, &restaurant).await?))
}
