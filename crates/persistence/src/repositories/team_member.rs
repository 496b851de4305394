//! Restaurant staff repository.

use domain::models::team_member::{CreateTeamMemberRequest, UpdateTeamMemberRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TeamMemberEntity;
use crate::metrics::QueryTimer;

const TEAM_SELECT: &str = r#"
    SELECT t.id, t.restaurant_id, r.manager_id AS restaurant_manager_id, t.name, t.role,
           t.phone, t.status, t.created_at
    FROM team_members t
    JOIN restaurants r ON r.id = t.restaurant_id
"#;

#[derive(Clone)]
pub struct TeamMemberRepository {
    pool: PgPool,
}

impl TeamMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Staff across all restaurants, or only those of one manager's restaurants.
    pub async fn list(&self, manager_id: Option<Uuid>) -> Result<Vec<TeamMemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_team_members");
        let sql = format!(
            "{} WHERE ($1::UUID IS NULL OR r.manager_id = $1) ORDER BY t.created_at DESC, t.id DESC",
            TEAM_SELECT
        );
        let result = sqlx::query_as::<_, TeamMemberEntity>(&sql)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<TeamMemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_team_member_by_id");
        let sql = format!("{} WHERE t.id = $1", TEAM_SELECT);
        let result = sqlx::query_as::<_, TeamMemberEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Insert a staff member. Returns its id.
    pub async fn create(
        &self,
        restaurant_id: i64,
        request: &CreateTeamMemberRequest,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("create_team_member");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO team_members (restaurant_id, name, role, phone, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(restaurant_id)
        .bind(request.name.trim())
        .bind(request.role.trim())
        .bind(&request.phone)
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateTeamMemberRequest,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_team_member");
        let result = sqlx::query(
            r#"
            UPDATE team_members
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                phone = COALESCE($4, phone),
                status = COALESCE($5, status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.role.as_deref().map(str::trim))
        .bind(request.phone.as_deref())
        .bind(request.status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_team_member");
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
