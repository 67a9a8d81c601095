//! Wall-clock snapshot consumed by the renderer.
//!
//! A [`ClockTime`] is read fresh for every frame and never cached between
//! frames, so the dial always reflects the local system time.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use serde::Serialize;

/// Time fields needed to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClockTime {
    /// Hour on a 12-hour dial (0-11)
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Day of month (1-31)
    pub day_of_month: u32,
    /// Short weekday label, e.g. "Mon"
    pub day_of_week: String,
}

impl ClockTime {
    /// Snapshot of the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            hour: dt.hour() % 12,
            minute: dt.minute(),
            second: dt.second(),
            day_of_month: dt.day(),
            day_of_week: dt.weekday().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_afternoon_folds_onto_twelve_hour_dial() {
        let time = ClockTime::from_datetime(&at(2025, 7, 24, 15, 42, 7));
        assert_eq!(time.hour, 3);
        assert_eq!(time.minute, 42);
        assert_eq!(time.second, 7);
        assert_eq!(time.day_of_month, 24);
        assert_eq!(time.day_of_week, "Thu");
    }

    #[test]
    fn test_noon_and_midnight_are_hour_zero() {
        assert_eq!(ClockTime::from_datetime(&at(2025, 1, 1, 0, 0, 0)).hour, 0);
        assert_eq!(ClockTime::from_datetime(&at(2025, 1, 1, 12, 0, 0)).hour, 0);
    }

    #[test]
    fn test_now_is_within_dial_ranges() {
        let time = ClockTime::now();
        assert!(time.hour < 12);
        assert!(time.minute < 60);
        assert!(time.second < 60);
        assert!((1..=31).contains(&time.day_of_month));
        assert_eq!(time.day_of_week.len(), 3);
    }
}
