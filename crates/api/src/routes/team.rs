//! Restaurant staff roster routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::team_member::{
    CreateTeamMemberRequest, TeamMemberResponse, UpdateTeamMemberRequest,
};
use domain::models::{Role, TeamMember};
use domain::services::{authorize, Action, Caller, Resource};
use persistence::repositories::TeamMemberRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};

use super::restaurants::owning_restaurant;

fn not_found() -> ApiError {
    ApiError::NotFound("Team member not found".to_string())
}

fn record_of(member: &TeamMember) -> Resource {
    Resource::RestaurantRecord {
        manager_id: member.restaurant_manager_id,
    }
}

/// Loads a roster entry the caller is allowed to manage. Others get a 404.
async fn load_member(state: &AppState, caller: &Caller, id: i64) -> Result<TeamMember, ApiError> {
    let member: TeamMember = TeamMemberRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    authorize(Some(caller), Action::Update, record_of(&member)).map_err(|_| not_found())?;
    Ok(member)
}

/// Admins see every roster, managers their own, everyone else nothing.
///
/// GET /api/v1/team
pub async fn list_team_members(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let manager_filter = match user.role {
        Role::Admin => None,
        Role::Manager => Some(user.id),
        Role::Client | Role::Driver => return Ok(Json(Vec::new())),
    };

    let members = TeamMemberRepository::new(state.pool.clone())
        .list(manager_filter)
        .await?;

    Ok(Json(
        members
            .into_iter()
            .map(|m| TeamMember::from(m).to_response())
            .collect(),
    ))
}

/// GET /api/v1/team/:id
pub async fn get_team_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TeamMemberResponse>, ApiError> {
    let member = load_member(&state, &user.caller(), id).await?;
    Ok(Json(member.to_response()))
}

/// POST /api/v1/team
pub async fn create_team_member(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateTeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMemberResponse>), ApiError> {
    let caller = user.caller();
    let restaurant = owning_restaurant(&state, &caller, request.restaurant_id, true)
        .await?
        .ok_or_else(|| ApiError::field("restaurant_id", "This field is required"))?;
    authorize(
        Some(&caller),
        Action::Create,
        Resource::RestaurantRecord {
            manager_id: restaurant.manager_id,
        },
    )?;
    request.validate()?;

    let repo = TeamMemberRepository::new(state.pool.clone());
    let id = repo.create(restaurant.id, &request).await?;
    let member: TeamMember = repo
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)?;

    info!(
        team_member_id = id,
        restaurant_id = restaurant.id,
        created_by = %caller.user_id,
        "Team member added"
    );
    Ok((StatusCode::CREATED, Json(member.to_response())))
}

/// PUT|PATCH /api/v1/team/:id
pub async fn update_team_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateTeamMemberRequest>,
) -> Result<Json<TeamMemberResponse>, ApiError> {
    let caller = user.caller();
    load_member(&state, &caller, id).await?;
    request.validate()?;

    let repo = TeamMemberRepository::new(state.pool.clone());
    if !repo.update(id, &request).await? {
        return Err(not_found());
    }

    info!(team_member_id = id, updated_by = %caller.user_id, "Team member updated");
    let member = load_member(&state, &caller, id).await?;
    Ok(Json(member.to_response()))
}

/// DELETE /api/v1/team/:id
pub async fn delete_team_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let caller = user.caller();
    load_member(&state, &caller, id).await?;

    if !TeamMemberRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(team_member_id = id, deleted_by = %caller.user_id, "Team member removed");
    Ok(StatusCode::NO_CONTENT)
}
