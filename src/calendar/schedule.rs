//! Recurring shift and transport schedules
//!
//! Both schedules are infinite, strictly increasing sequences of absolute
//! simulation instants that repeat every 168 hours. They are expressed as pure
//! functions of the instant's index, so any number of consumers can walk them
//! independently through a [`ScheduleCursor`].

use super::week::{WeekCalendar, HOURS_PER_DAY, HOURS_PER_WEEK, WEEK};
use thiserror::Error;

/// Errors raised while walking a schedule
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    /// An emitted instant did not strictly exceed its predecessor
    #[error("schedule emitted {next} at index {index} after {previous}")]
    NonMonotonic {
        /// Index of the offending instant
        index: u64,
        /// Previously emitted instant
        previous: f64,
        /// Offending instant
        next: f64,
    },
}

/// An indexed sequence of simulation instants
pub trait Schedule {
    /// The k-th instant, or `None` if the schedule emits nothing at all
    fn instant(&self, k: u64) -> Option<f64>;

    /// Number of instants in one weekly pattern
    fn period(&self) -> u64;
}

/// Alternating opening and closing instants: open, close, open, close, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftSchedule {
    calendar: WeekCalendar,
}

impl ShiftSchedule {
    /// Build the shift schedule of a calendar
    pub fn new(calendar: WeekCalendar) -> Self {
        Self { calendar }
    }

    /// Opening and closing instants of the n-th shift (one shift per day)
    pub fn shift(&self, n: u64) -> (f64, f64) {
        let day_start = n as f64 * HOURS_PER_DAY;
        let hours = self.calendar.opening_hours(WEEK[(n % 7) as usize]);
        (day_start + hours.open, day_start + hours.close)
    }

    /// Index of the first shift whose opening is at or after `t`
    pub fn first_shift_opening_at_or_after(&self, t: f64) -> u64 {
        let mut n = (t.max(0.0) / HOURS_PER_DAY).floor() as u64;
        while self.shift(n).0 < t {
            n += 1;
        }
        n
    }
}

impl Schedule for ShiftSchedule {
    fn instant(&self, k: u64) -> Option<f64> {
        let (open, close) = self.shift(k / 2);
        Some(if k % 2 == 0 { open } else { close })
    }

    fn period(&self) -> u64 {
        14
    }
}

/// Daily pickup instants from the weekday and weekend pickup lists
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSchedule {
    pattern: Vec<f64>,
}

impl TransportSchedule {
    /// Build the weekly pickup pattern
    ///
    /// Both lists must be strictly ascending times of day in `[0, 24)`.
    pub fn new(calendar_days: [&[f64]; 2]) -> Self {
        let [weekday_times, weekend_times] = calendar_days;
        let pattern = WEEK
            .iter()
            .enumerate()
            .flat_map(|(index, day)| {
                let times = if super::week::is_weekend(*day) { weekend_times } else { weekday_times };
                times.iter().map(move |t| index as f64 * HOURS_PER_DAY + t)
            })
            .collect();
        Self { pattern }
    }

    /// Build from weekday and weekend pickup lists
    pub fn from_lists(weekday_times: &[f64], weekend_times: &[f64]) -> Self {
        Self::new([weekday_times, weekend_times])
    }

    /// Whether no pickups are ever scheduled
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

impl Schedule for TransportSchedule {
    fn instant(&self, k: u64) -> Option<f64> {
        let period = self.pattern.len() as u64;
        if period == 0 {
            return None;
        }
        let week = (k / period) as f64;
        Some(self.pattern[(k % period) as usize] + HOURS_PER_WEEK * week)
    }

    fn period(&self) -> u64 {
        self.pattern.len() as u64
    }
}

/// Independent "peek / advance" cursor over a schedule
#[derive(Debug, Clone)]
pub struct ScheduleCursor<S: Schedule> {
    schedule: S,
    index: u64,
    last: Option<f64>,
}

impl<S: Schedule> ScheduleCursor<S> {
    /// Start a cursor at the first instant
    pub fn new(schedule: S) -> Self {
        Self { schedule, index: 0, last: None }
    }

    /// The next instant without consuming it
    pub fn peek(&self) -> Option<f64> {
        self.schedule.instant(self.index)
    }

    /// Consume and return the next instant
    pub fn advance(&mut self) -> Result<Option<f64>, ScheduleError> {
        let Some(next) = self.schedule.instant(self.index) else {
            return Ok(None);
        };
        if let Some(previous) = self.last {
            if next <= previous {
                return Err(ScheduleError::NonMonotonic { index: self.index, previous, next });
            }
        }
        self.index += 1;
        self.last = Some(next);
        Ok(Some(next))
    }

    /// Number of instants consumed so far
    pub fn position(&self) -> u64 {
        self.index
    }

    /// The underlying schedule
    pub fn schedule(&self) -> &S {
        &self.schedule
    }
}
