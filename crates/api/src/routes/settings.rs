//! Application settings routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::app_setting::{settings_map, UpsertSettingRequest};
use domain::models::AppSetting;
use domain::services::{authorize, Action, Resource};
use persistence::repositories::AppSettingRepository;
use std::collections::BTreeMap;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};

const MAX_KEY_LEN: usize = 100;

fn validate_key(key: &str) -> Result<(), ApiError> {
    if key.trim().is_empty() || key.len() > MAX_KEY_LEN {
        return Err(ApiError::field(
            "key",
            format!("Key must be 1-{} characters", MAX_KEY_LEN),
        ));
    }
    Ok(())
}

/// Flat `{key: value}` map of every setting.
///
/// GET /api/v1/settings
pub async fn list_settings(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let settings: Vec<AppSetting> = AppSettingRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(settings_map(&settings)))
}

/// PUT /api/v1/settings/:key
pub async fn upsert_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(key): Path<String>,
    AppJson(request): AppJson<UpsertSettingRequest>,
) -> Result<Json<AppSetting>, ApiError> {
    authorize(Some(&user.caller()), Action::Update, Resource::Setting)?;
    validate_key(&key)?;
    request.validate()?;

    let setting: AppSetting = AppSettingRepository::new(state.pool.clone())
        .upsert(&key, &request.value, &request.description)
        .await?
        .into();

    info!(key = %setting.key, updated_by = %user.id, "Setting saved");
    Ok(Json(setting))
}

/// DELETE /api/v1/settings/:key
pub async fn delete_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(Some(&user.caller()), Action::Delete, Resource::Setting)?;

    if !AppSettingRepository::new(state.pool.clone())
        .delete(&key)
        .await?
    {
        return Err(ApiError::NotFound("Setting not found".to_string()));
    }

    info!(key = %key, deleted_by = %user.id, "Setting deleted");
    Ok(StatusCode::NO_CONTENT)
}
