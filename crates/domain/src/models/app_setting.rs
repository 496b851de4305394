//! Key/value application settings read by the mobile apps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSetting {
    pub key: String,
    pub value: String,
    pub description: String,
}

/// Flattens settings into `{key: value}`.
pub fn settings_map(settings: &[AppSetting]) -> BTreeMap<String, String> {
    settings
        .iter()
        .map(|s| (s.key.clone(), s.value.clone()))
        .collect()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertSettingRequest {
    #[validate(length(max = 10_000))]
    pub value: String,
    #[serde(default)]
    pub description: String,
}
