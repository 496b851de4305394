//! Driver schedule entity (database row mapping).

use chrono::NaiveTime;
use domain::models::{DriverSchedule, Weekday};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the driver_schedules table.
#[derive(Debug, Clone, FromRow)]
pub struct DriverScheduleEntity {
    pub id: i64,
    pub driver_id: Uuid,
    pub day: String,
    pub is_enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TryFrom<DriverScheduleEntity> for DriverSchedule {
    type Error = String;

    fn try_from(entity: DriverScheduleEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            driver_id: entity.driver_id,
            day: entity.day.parse::<Weekday>()?,
            is_enabled: entity.is_enabled,
            start_time: entity.start_time,
            end_time: entity.end_time,
        })
    }
}
