//! Duration adjuster
//!
//! Converts a raw amount of active work into the calendar time it really takes
//! once nights and weekends are accounted for. Work only progresses inside a
//! day's opening interval; whatever does not fit before closing time is carried
//! over to the next day's opening.

use super::week::{next_weekday, WeekCalendar, HOURS_PER_DAY, WEEK};
use chrono::Weekday;

/// Elapsed calendar hours needed to spend `raw` hours of active time
///
/// `start_tod` is the time of day the work starts on `start_day`. A start past
/// closing time is clipped to the closing time, so the whole duration is
/// carried to the next opening.
///
/// The result is never smaller than `raw`, and equals it exactly when
/// `start_tod + raw` does not exceed the day's closing time.
pub fn adjust(calendar: &WeekCalendar, raw: f64, start_tod: f64, start_day: Weekday) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return raw;
    }
    let weekly_open: f64 = WEEK.iter().map(|day| calendar.opening_hours(*day).length()).sum();
    if weekly_open <= 0.0 {
        return f64::INFINITY;
    }

    let mut day = start_day;
    let mut hours = calendar.opening_hours(day);
    let mut tod = start_tod.min(hours.close);
    let mut remaining = raw;
    let mut elapsed = raw;

    while tod + remaining > hours.close {
        remaining -= hours.close - tod;
        let next = calendar.opening_hours(next_weekday(day));
        elapsed += (HOURS_PER_DAY - hours.close) + next.open;
        day = next_weekday(day);
        hours = next;
        tod = hours.open;
    }

    elapsed
}

/// Calendar time consumed by closed periods alone
pub fn closed_overhead(calendar: &WeekCalendar, raw: f64, start_tod: f64, start_day: Weekday) -> f64 {
    adjust(calendar, raw, start_tod, start_day) - raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::OpeningHours;

    #[test]
    fn test_fits_before_close() {
        let calendar = WeekCalendar::default();
        assert_eq!(adjust(&calendar, 1.0, 10.0, Weekday::Mon), 1.0);
        assert_eq!(adjust(&calendar, 7.5, 10.0, Weekday::Mon), 7.5);
        assert_eq!(adjust(&calendar, 0.0, 17.5, Weekday::Mon), 0.0);
    }

    #[test]
    fn test_overnight_carry() {
        let calendar = WeekCalendar::default();
        // Monday 17:00 + 1h: 0.5h today, 0.5h Tuesday morning
        assert_eq!(adjust(&calendar, 1.0, 17.0, Weekday::Mon), 1.0 + 6.5 + 9.0);
    }

    #[test]
    fn test_friday_into_weekend() {
        let calendar = WeekCalendar::default();
        let elapsed = adjust(&calendar, 1.0, 17.0, Weekday::Fri);
        assert_eq!(elapsed, 16.5);
        assert_eq!(closed_overhead(&calendar, 1.0, 17.0, Weekday::Fri), 15.5);
    }

    #[test]
    fn test_multi_day_carry() {
        let calendar = WeekCalendar::default();
        // Saturday 12:00, 6h of work: 1h Saturday, 4h Sunday, 1h Monday
        let elapsed = adjust(&calendar, 6.0, 12.0, Weekday::Sat);
        let expected = 6.0 + 2.0 * ((24.0 - 13.0) + 9.0);
        assert_eq!(elapsed, expected);
    }

    #[test]
    fn test_start_after_close_is_clipped() {
        let calendar = WeekCalendar::default();
        // Starting at 20:00 behaves like starting at closing time
        assert_eq!(
            adjust(&calendar, 1.0, 20.0, Weekday::Mon),
            adjust(&calendar, 1.0, 17.5, Weekday::Mon)
        );
        assert_eq!(adjust(&calendar, 1.0, 17.5, Weekday::Mon), 1.0 + 6.5 + 9.0);
    }

    #[test]
    fn test_custom_hours() {
        let calendar =
            WeekCalendar::new(OpeningHours::new(8.0, 12.0), OpeningHours::new(10.0, 11.0));
        // Thursday 11:00, 2h: 1h Thursday, 1h Friday from 08:00
        assert_eq!(adjust(&calendar, 2.0, 11.0, Weekday::Thu), 2.0 + 12.0 + 8.0);
    }

    #[test]
    fn test_closed_calendar_never_finishes() {
        let calendar = WeekCalendar::new(OpeningHours::new(9.0, 9.0), OpeningHours::new(9.0, 9.0));
        assert!(adjust(&calendar, 1.0, 9.0, Weekday::Mon).is_infinite());
    }
}
