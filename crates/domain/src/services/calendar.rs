//! Calendar-day windows for "today" dashboard counters.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// UTC bounds `[start, end)` of the calendar day containing `now`, in `now`'s zone.
pub fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let date = now.date_naive();
    let next = date.succ_opt().unwrap_or(date);
    (local_midnight(&tz, date), local_midnight(&tz, next))
}

/// Bounds of today in the server's local time zone.
pub fn today_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(&Local::now())
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump; treat the wall time as UTC.
        None => Utc.from_utc_datetime(&midnight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_bounds_in_utc() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 30, 0).unwrap();
        let (start, end) = day_bounds(&now);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_bounds_follow_local_offset() {
        // West Africa Time, UTC+1
        let wat = FixedOffset::east_opt(3600).unwrap();
        let now = wat.with_ymd_and_hms(2025, 3, 14, 0, 30, 0).unwrap();
        let (start, end) = day_bounds(&now);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 13, 23, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 14, 23, 0, 0).unwrap());
        assert!(start <= now.with_timezone(&Utc) && now.with_timezone(&Utc) < end);
    }

    #[test]
    fn test_today_contains_now() {
        let (start, end) = today_bounds();
        let now = Utc::now();
        assert!(start <= now && now < end + chrono::Duration::seconds(1));
    }
}
