// ⏰ Time Windows - UTC calendar day and Monday-anchored week-to-date
// Both windows are inclusive on each end and derived from the candidate's UTC date.
// The day window runs to the last nanosecond of the day, so no instant falls between days.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Inclusive `[start, end]` range of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// `[00:00:00, 23:59:59.999999999]` UTC of the given instant's calendar date
pub fn day_window(time: DateTime<Utc>) -> TimeWindow {
    let start = start_of_day(time);
    TimeWindow {
        start,
        end: start + Duration::days(1) - Duration::nanoseconds(1),
    }
}

/// Monday 00:00 UTC on or before the instant's date, through the instant itself.
///
/// Week-to-date, not a trailing seven days: a Monday candidate only sees Monday.
pub fn week_to_date_window(time: DateTime<Utc>) -> TimeWindow {
    let days_since_monday = time.weekday().num_days_from_monday() as i64;
    TimeWindow {
        start: start_of_day(time) - Duration::days(days_since_monday),
        end: time,
    }
}

fn start_of_day(time: DateTime<Utc>) -> DateTime<Utc> {
    time.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Weekday};

    fn contains(window: &TimeWindow, time: DateTime<Utc>) -> bool {
        window.start <= time && time <= window.end
    }

    #[test]
    fn test_day_window_bounds() {
        let time = Utc.with_ymd_and_hms(2000, 1, 1, 16, 0, 0).unwrap();
        let window = day_window(time);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2000, 1, 1, 23, 59, 59).unwrap() + Duration::nanoseconds(999_999_999)
        );
        assert!(contains(&window, time));
        assert!(!contains(&window, Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_last_nanosecond_belongs_to_its_day() {
        let midnight = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let late = midnight - Duration::nanoseconds(1);
        assert_eq!(late.nanosecond(), 999_999_999);

        let window = day_window(late);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert!(contains(&window, late));
        assert!(contains(&window, midnight - Duration::microseconds(900)));
        assert!(!contains(&window, midnight));
        assert_eq!(day_window(midnight).start, midnight);
    }

    #[test]
    fn test_week_window_starts_on_monday() {
        // 2000-01-01 was a Saturday; that week began Monday 1999-12-27
        let saturday = Utc.with_ymd_and_hms(2000, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(saturday.weekday(), Weekday::Sat);

        let window = week_to_date_window(saturday);

        assert_eq!(window.start, Utc.with_ymd_and_hms(1999, 12, 27, 0, 0, 0).unwrap());
        assert_eq!(window.start.weekday(), Weekday::Mon);
        assert_eq!(window.end, saturday);
    }

    #[test]
    fn test_week_window_on_monday_is_same_day() {
        let monday = Utc.with_ymd_and_hms(2000, 1, 3, 9, 0, 0).unwrap();
        let window = week_to_date_window(monday);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2000, 1, 3, 0, 0, 0).unwrap());
        // Sunday before is a different week
        assert!(!contains(&window, Utc.with_ymd_and_hms(2000, 1, 2, 23, 0, 0).unwrap()));
    }

    #[test]
    fn test_sunday_shares_week_with_saturday() {
        let saturday = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();

        assert!(contains(&week_to_date_window(sunday), saturday));
    }

    #[test]
    fn test_week_window_excludes_later_same_week_loads() {
        let candidate = Utc.with_ymd_and_hms(2000, 1, 5, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2000, 1, 5, 12, 0, 1).unwrap();

        assert!(!contains(&week_to_date_window(candidate), later));
    }
}
