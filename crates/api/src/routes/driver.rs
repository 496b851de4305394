//! Driver area: weekly schedule, availability, dashboard and missions.

use axum::{extract::State, Json};
use domain::models::driver_schedule::{
    default_week, DriverScheduleResponse, UpdateScheduleDayRequest,
};
use domain::models::order::OrderResponse;
use domain::models::user::AvailabilityResponse;
use domain::models::{DriverDashboard, DriverSchedule};
use domain::services::calendar::today_bounds;
use domain::services::{authorize, Action, Resource};
use persistence::entities::DriverScheduleEntity;
use persistence::repositories::{
    DashboardRepository, DriverScheduleRepository, OrderRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};

use super::orders::render;

fn require_driver(user: &CurrentUser) -> Result<(), ApiError> {
    authorize(Some(&user.caller()), Action::View, Resource::DriverArea)?;
    Ok(())
}

fn to_schedule(entity: DriverScheduleEntity) -> Result<DriverSchedule, ApiError> {
    DriverSchedule::try_from(entity)
        .map_err(|e| ApiError::Internal(format!("Corrupt schedule row: {}", e)))
}

/// The driver's seven days, Monday first. Missing rows are created with defaults.
async fn load_week(state: &AppState, driver_id: Uuid) -> Result<Vec<DriverSchedule>, ApiError> {
    let repo = DriverScheduleRepository::new(state.pool.clone());
    let mut rows = repo.list_for_driver(driver_id).await?;
    if rows.len() < default_week().len() {
        rows = repo.provision(driver_id, &default_week()).await?;
        info!(driver_id = %driver_id, "Driver schedule provisioned");
    }

    let mut week = rows
        .into_iter()
        .map(to_schedule)
        .collect::<Result<Vec<_>, _>>()?;
    week.sort_by_key(|d| d.day.index());
    Ok(week)
}

/// GET /api/v1/driver/schedule
pub async fn get_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<DriverScheduleResponse>>, ApiError> {
    require_driver(&user)?;

    let week = load_week(&state, user.id).await?;
    Ok(Json(week.iter().map(DriverSchedule::to_response).collect()))
}

/// Updates one day on top of its current values.
///
/// POST /api/v1/driver/schedule/update_day
pub async fn update_day(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<UpdateScheduleDayRequest>,
) -> Result<Json<DriverScheduleResponse>, ApiError> {
    require_driver(&user)?;
    request.validate()?;

    let week = load_week(&state, user.id).await?;
    let current = week.iter().find(|d| d.day == request.day);
    let day = request.apply(current);
    if !day.has_valid_window() {
        return Err(ApiError::field(
            "end_time",
            "End time must be after start time",
        ));
    }

    let saved = DriverScheduleRepository::new(state.pool.clone())
        .upsert_day(user.id, &day)
        .await?;
    let saved = to_schedule(saved)?;

    info!(
        driver_id = %user.id,
        day = saved.day.as_str(),
        is_enabled = saved.is_enabled,
        "Schedule day updated"
    );
    Ok(Json(saved.to_response()))
}

/// POST /api/v1/driver/schedule/toggle_availability
pub async fn toggle_availability(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    require_driver(&user)?;

    let is_available = UserRepository::new(state.pool.clone())
        .toggle_availability(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(driver_id = %user.id, is_available, "Driver availability toggled");
    Ok(Json(AvailabilityResponse { is_available }))
}

/// GET /api/v1/driver/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DriverDashboard>, ApiError> {
    require_driver(&user)?;

    let stats = DashboardRepository::new(state.pool.clone())
        .driver_stats(user.id, today_bounds())
        .await?;

    Ok(Json(DriverDashboard {
        is_available: user.is_available,
        ..stats
    }))
}

/// Own orders plus ready orders nobody has claimed, newest first.
///
/// GET /api/v1/driver/missions
pub async fn missions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    require_driver(&user)?;

    let repo = OrderRepository::new(state.pool.clone());
    let orders = repo.hydrate(repo.list_missions(user.id).await?).await?;
    Ok(Json(render(&state, &orders)))
}
