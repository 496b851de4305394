//! Team member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{TeamMember, TeamMemberStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `team_members` with the owning restaurant's manager.
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberEntity {
    pub id: i64,
    pub restaurant_id: i64,
    pub restaurant_manager_id: Option<Uuid>,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<TeamMemberEntity> for TeamMember {
    fn from(entity: TeamMemberEntity) -> Self {
        Self {
            id: entity.id,
            restaurant_id: entity.restaurant_id,
            restaurant_manager_id: entity.restaurant_manager_id,
            name: entity.name,
            role: entity.role,
            phone: entity.phone,
            status: entity.status.parse().unwrap_or(TeamMemberStatus::Inactive),
            created_at: entity.created_at,
        }
    }
}
