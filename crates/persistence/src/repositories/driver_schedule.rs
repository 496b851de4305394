//! Driver weekly schedule repository.

use domain::models::driver_schedule::ScheduleDay;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DriverScheduleEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct DriverScheduleRepository {
    pool: PgPool,
}

impl DriverScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<DriverScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_driver_schedule");
        let result = sqlx::query_as::<_, DriverScheduleEntity>(
            r#"
            SELECT id, driver_id, day, is_enabled, start_time, end_time
            FROM driver_schedules
            WHERE driver_id = $1
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert the given days, leaving existing rows alone, and return the full week.
    pub async fn provision(
        &self,
        driver_id: Uuid,
        days: &[ScheduleDay],
    ) -> Result<Vec<DriverScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("provision_driver_schedule");
        let mut tx = self.pool.begin().await?;

        for day in days {
            sqlx::query(
                r#"
                INSERT INTO driver_schedules (driver_id, day, is_enabled, start_time, end_time)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (driver_id, day) DO NOTHING
                "#,
            )
            .bind(driver_id)
            .bind(day.day.as_str())
            .bind(day.is_enabled)
            .bind(day.start_time)
            .bind(day.end_time)
            .execute(&mut *tx)
            .await?;
        }

        let rows = sqlx::query_as::<_, DriverScheduleEntity>(
            r#"
            SELECT id, driver_id, day, is_enabled, start_time, end_time
            FROM driver_schedules
            WHERE driver_id = $1
            "#,
        )
        .bind(driver_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(rows)
    }

    /// Create or replace one day.
    pub async fn upsert_day(
        &self,
        driver_id: Uuid,
        day: &ScheduleDay,
    ) -> Result<DriverScheduleEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_driver_schedule_day");
        let result = sqlx::query_as::<_, DriverScheduleEntity>(
            r#"
            INSERT INTO driver_schedules (driver_id, day, is_enabled, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (driver_id, day) DO UPDATE
            SET is_enabled = EXCLUDED.is_enabled,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time
            RETURNING id, driver_id, day, is_enabled, start_time, end_time
            "#,
        )
        .bind(driver_id)
        .bind(day.day.as_str())
        .bind(day.is_enabled)
        .bind(day.start_time)
        .bind(day.end_time)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
