//! Weekly calendar of the dispensary
//!
//! Pure time arithmetic over the repeating week: opening hours, the recurring
//! shift and transport schedules, and the adjuster that stretches work across
//! closed periods.
//!
//! # Usage Example
//!
//! ```rust
//! use dispensary_delivery_simulator::calendar::*;
//! use chrono::Weekday;
//!
//! let calendar = WeekCalendar::default();
//! assert_eq!(day_of_week(4.0 * 24.0 + 17.0), Weekday::Fri);
//!
//! // One hour of work starting Friday 17:00 finishes Saturday 09:30
//! assert_eq!(adjust(&calendar, 1.0, 17.0, Weekday::Fri), 16.5);
//!
//! let shifts = ShiftSchedule::new(calendar);
//! assert_eq!(shifts.instant(0), Some(9.0));
//! ```

pub mod adjuster;
pub mod schedule;
pub mod week;

pub use adjuster::{adjust, closed_overhead};
pub use schedule::{Schedule, ScheduleCursor, ScheduleError, ShiftSchedule, TransportSchedule};
pub use week::{
    day_of_week, is_weekend, next_weekday, time_of_day, weekday_name, OpeningHours, WeekCalendar,
    HOURS_PER_DAY, HOURS_PER_WEEK, WEEK,
};
