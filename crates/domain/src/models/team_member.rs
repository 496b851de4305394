//! Restaurant staff roster (informational, not login accounts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_phone};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamMemberStatus {
    #[default]
    Active,
    Inactive,
}

impl TeamMemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMemberStatus::Active => "active",
            TeamMemberStatus::Inactive => "inactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamMemberStatus::Active => "Actif",
            TeamMemberStatus::Inactive => "Inactif",
        }
    }
}

impl FromStr for TeamMemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TeamMemberStatus::Active),
            "inactive" => Ok(TeamMemberStatus::Inactive),
            _ => Err(format!("Invalid team member status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub restaurant_id: i64,
    pub restaurant_manager_id: Option<Uuid>,
    pub name: String,
    /// Free-text job title (cook, cashier...)
    pub role: String,
    pub phone: String,
    pub status: TeamMemberStatus,
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn to_response(&self) -> TeamMemberResponse {
        TeamMemberResponse {
            id: self.id,
            restaurant: self.restaurant_id,
            name: self.name.clone(),
            role: self.role.clone(),
            phone: self.phone.clone(),
            status: self.status,
            status_display: self.status.label(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberResponse {
    pub id: i64,
    pub restaurant: i64,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub status: TeamMemberStatus,
    pub status_display: &'static str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTeamMemberRequest {
    /// Required for admins; managers always add to their own restaurant.
    pub restaurant_id: Option<i64>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub role: String,
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub status: TeamMemberStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTeamMemberRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub role: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub status: Option<TeamMemberStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_and_parse() {
        assert_eq!(TeamMemberStatus::default(), TeamMemberStatus::Active);
        assert_eq!("inactive".parse::<TeamMemberStatus>().unwrap(), TeamMemberStatus::Inactive);
        assert!("fired".parse::<TeamMemberStatus>().is_err());
    }

    #[test]
    fn test_create_requires_job_title() {
        let req: CreateTeamMemberRequest =
            serde_json::from_str(r#"{"name": "Rachidi", "role": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_status_rejected_at_parse() {
        let result = serde_json::from_str::<UpdateTeamMemberRequest>(r#"{"status": "on_leave"}"#);
        assert!(result.is_err());
    }
}
