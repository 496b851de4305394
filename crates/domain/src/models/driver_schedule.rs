//! Weekly working schedule of a driver.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lundi",
            Weekday::Tuesday => "Mardi",
            Weekday::Wednesday => "Mercredi",
            Weekday::Thursday => "Jeudi",
            Weekday::Friday => "Vendredi",
            Weekday::Saturday => "Samedi",
            Weekday::Sunday => "Dimanche",
        }
    }

    /// Monday is 0.
    pub fn index(&self) -> usize {
        Weekday::ALL
            .iter()
            .position(|d| d == self)
            .unwrap_or_default()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| format!("Invalid day: {}", s))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

pub fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSchedule {
    pub id: i64,
    pub driver_id: Uuid,
    pub day: Weekday,
    pub is_enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl DriverSchedule {
    pub fn to_response(&self) -> DriverScheduleResponse {
        DriverScheduleResponse {
            id: self.id,
            day: self.day,
            day_display: self.day.label(),
            is_enabled: self.is_enabled,
            start_time: self.start_time.format("%H:%M").to_string(),
            end_time: self.end_time.format("%H:%M").to_string(),
        }
    }
}

/// Row values for a day that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDay {
    pub day: Weekday,
    pub is_enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// The week given to a driver the first time they open their schedule:
/// weekdays enabled, weekend disabled, 08:00 to 18:00.
pub fn default_week() -> Vec<ScheduleDay> {
    Weekday::ALL
        .into_iter()
        .map(|day| ScheduleDay {
            day,
            is_enabled: !day.is_weekend(),
            start_time: default_start_time(),
            end_time: default_end_time(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverScheduleResponse {
    pub id: i64,
    pub day: Weekday,
    pub day_display: &'static str,
    pub is_enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateScheduleDayRequest {
    pub day: Weekday,
    pub is_enabled: Option<bool>,
    #[serde(default, deserialize_with = "optional_hhmm::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "optional_hhmm::deserialize")]
    pub end_time: Option<NaiveTime>,
}

impl UpdateScheduleDayRequest {
    /// Applies the update on top of the stored (or default) day.
    pub fn apply(&self, current: Option<&DriverSchedule>) -> ScheduleDay {
        let (enabled, start, end) = match current {
            Some(c) => (c.is_enabled, c.start_time, c.end_time),
            None => (
                !self.day.is_weekend(),
                default_start_time(),
                default_end_time(),
            ),
        };
        ScheduleDay {
            day: self.day,
            is_enabled: self.is_enabled.unwrap_or(enabled),
            start_time: self.start_time.unwrap_or(start),
            end_time: self.end_time.unwrap_or(end),
        }
    }
}

impl ScheduleDay {
    pub fn has_valid_window(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
mod optional_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map_err(|_| serde::de::Error::custom(format!("Invalid time: {}", s)))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_week_disables_weekend() {
        let week = default_week();
        assert_eq!(week.len(), 7);
        assert_eq!(week.iter().filter(|d| d.is_enabled).count(), 5);
        assert!(!week[5].is_enabled && !week[6].is_enabled);
        assert!(week
            .iter()
            .all(|d| d.start_time == default_start_time() && d.end_time == default_end_time()));
    }

    #[test]
    fn test_weekday_order_and_parse() {
        assert_eq!(Weekday::Monday.index(), 0);
        assert_eq!(Weekday::Sunday.index(), 6);
        assert!(Weekday::Friday < Weekday::Saturday);
        assert_eq!("Wednesday".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert!("funday".parse::<Weekday>().is_err());
        assert_eq!(Weekday::Thursday.label(), "Jeudi");
    }

    #[test]
    fn test_update_parses_short_times() {
        let req: UpdateScheduleDayRequest =
            serde_json::from_str(r#"{"day": "saturday", "start_time": "10:30", "end_time": "14:00:00"}"#)
                .unwrap();
        let day = req.apply(None);

        assert_eq!(day.day, Weekday::Saturday);
        assert!(!day.is_enabled);
        assert_eq!(day.start_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(day.end_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(day.has_valid_window());
    }

    #[test]
    fn test_update_keeps_stored_values() {
        let stored = DriverSchedule {
            id: 1,
            driver_id: Uuid::new_v4(),
            day: Weekday::Monday,
            is_enabled: true,
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        };
        let req: UpdateScheduleDayRequest =
            serde_json::from_str(r#"{"day": "monday", "is_enabled": false}"#).unwrap();
        let day = req.apply(Some(&stored));

        assert!(!day.is_enabled);
        assert_eq!(day.start_time, stored.start_time);
        assert_eq!(day.end_time, stored.end_time);
    }

    #[test]
    fn test_inverted_window_detected() {
        let req: UpdateScheduleDayRequest =
            serde_json::from_str(r#"{"day": "monday", "start_time": "19:00"}"#).unwrap();
        assert!(!req.apply(None).has_valid_window());
    }

    #[test]
    fn test_bad_time_rejected() {
        let result = serde_json::from_str::<UpdateScheduleDayRequest>(
            r#"{"day": "monday", "start_time": "25:99"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_response_formats_times() {
        let row = DriverSchedule {
            id: 9,
            driver_id: Uuid::new_v4(),
            day: Weekday::Sunday,
            is_enabled: false,
            start_time: default_start_time(),
            end_time: default_end_time(),
        };
        let response = row.to_response();
        assert_eq!(response.start_time, "08:00");
        assert_eq!(response.end_time, "18:00");
        assert_eq!(response.day_display, "Dimanche");
    }
}
