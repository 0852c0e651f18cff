//! Weekly opening-hours calendar
//!
//! Simulation time is a plain number of hours since Monday 00:00. This module
//! maps it onto the weekly cycle and the dispensary's opening intervals.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Hours in one day
pub const HOURS_PER_DAY: f64 = 24.0;

/// Hours in one week
pub const HOURS_PER_WEEK: f64 = 168.0;

/// Weekdays in simulation order; time 0 falls on the first entry
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One day's opening interval in hours of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Time of day the dispensary opens
    pub open: f64,
    /// Time of day the dispensary closes
    pub close: f64,
}

impl OpeningHours {
    /// Monday to Friday default, 09:00 to 17:30
    pub const WEEKDAY_DEFAULT: OpeningHours = OpeningHours { open: 9.0, close: 17.5 };

    /// Saturday and Sunday default, 09:00 to 13:00
    pub const WEEKEND_DEFAULT: OpeningHours = OpeningHours { open: 9.0, close: 13.0 };

    /// Create an opening interval
    pub fn new(open: f64, close: f64) -> Self {
        Self { open, close }
    }

    /// Whether a time of day lies within `[open, close)`
    pub fn contains(&self, time_of_day: f64) -> bool {
        time_of_day >= self.open && time_of_day < self.close
    }

    /// Length of the working day in hours
    pub fn length(&self) -> f64 {
        self.close - self.open
    }
}

/// Time of day in `[0, 24)` for a simulation instant
pub fn time_of_day(t: f64) -> f64 {
    t.rem_euclid(HOURS_PER_DAY)
}

/// Day of the week for a simulation instant, with time 0 on a Monday
pub fn day_of_week(t: f64) -> Weekday {
    let index = (t.rem_euclid(HOURS_PER_WEEK) / HOURS_PER_DAY).floor() as usize;
    WEEK[index.min(6)]
}

/// Cyclic successor of a weekday
pub fn next_weekday(day: Weekday) -> Weekday {
    day.succ()
}

/// Full English name of a weekday, as written to exported tables
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Whether a weekday uses the weekend opening hours
pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Immutable mapping of every weekday to its opening interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekCalendar {
    weekday: OpeningHours,
    weekend: OpeningHours,
}

impl WeekCalendar {
    /// Create a calendar from the weekday and weekend intervals
    pub fn new(weekday: OpeningHours, weekend: OpeningHours) -> Self {
        Self { weekday, weekend }
    }

    /// Opening interval of the given day
    pub fn opening_hours(&self, day: Weekday) -> OpeningHours {
        if is_weekend(day) {
            self.weekend
        } else {
            self.weekday
        }
    }

    /// Whether the dispensary is open at a simulation instant
    pub fn is_open(&self, t: f64) -> bool {
        self.opening_hours(day_of_week(t)).contains(time_of_day(t))
    }

    /// Closed hours between `t` and the next opening; zero while open
    ///
    /// At exactly closing time the dispensary counts as closed, matching the
    /// carry-over rule of the duration adjuster.
    pub fn closed_time_until_open(&self, t: f64) -> f64 {
        let day = day_of_week(t);
        let tod = time_of_day(t);
        let hours = self.opening_hours(day);

        if tod < hours.open {
            hours.open - tod
        } else if tod >= hours.close {
            (HOURS_PER_DAY - tod) + self.opening_hours(next_weekday(day)).open
        } else {
            0.0
        }
    }
}

impl Default for WeekCalendar {
    fn default() -> Self {
        Self::new(OpeningHours::WEEKDAY_DEFAULT, OpeningHours::WEEKEND_DEFAULT)
    }
}
