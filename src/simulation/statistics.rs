//! Statistics collection and reporting
//!
//! Reduces a finished run's metrics log to the summary figures: mean
//! throughput, mean total waiting and completion counts, merged with the run
//! parameters that produced them.

use crate::simulation::metrics::{MetricsLog, PickupAuditRow};
use crate::types::{RunId, RunParameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Round to two decimals, as reported in the summary
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of the defined values; `None` if there are none
pub fn mean_of_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Headline results of one run, merged with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: RunId,
    /// Parameters the run used
    #[serde(flatten)]
    pub parameters: RunParameters,
    /// Mean arrival-to-delivery time of delivered prescriptions (2 decimals)
    pub mean_throughput: Option<f64>,
    /// Mean overall waiting time of delivered prescriptions (2 decimals)
    pub mean_waiting: Option<f64>,
    /// Prescriptions that arrived
    pub total_work_items: usize,
    /// Prescriptions delivered before the horizon
    pub completed_work_items: usize,
    /// Delivered share in percent (2 decimals); `None` when nothing arrived
    pub percentage_completed: Option<f64>,
    /// Pickup cycles that ran
    pub pickup_cycles: usize,
    /// Pickup cycles that found the store empty
    pub empty_pickups: usize,
}

impl RunSummary {
    /// Summarise a finished run
    pub fn from_results(
        run_id: RunId,
        parameters: RunParameters,
        metrics: &MetricsLog,
        pickups: &[PickupAuditRow],
    ) -> Self {
        let total = metrics.len();
        let completed = metrics.completed();
        let percentage_completed = if total == 0 {
            None
        } else {
            Some(round2(completed as f64 / total as f64 * 100.0))
        };

        Self {
            run_id,
            parameters,
            mean_throughput: mean_of_defined(metrics.iter().map(|row| row.throughput())).map(round2),
            mean_waiting: mean_of_defined(metrics.iter().map(|row| row.overall_waiting()))
                .map(round2),
            total_work_items: total,
            completed_work_items: completed,
            percentage_completed,
            pickup_cycles: pickups.len(),
            empty_pickups: pickups.iter().filter(|row| row.items_in_store_before == 0).count(),
        }
    }

    /// Prescriptions still in the dispensary or on the road at the horizon
    pub fn not_completed(&self) -> usize {
        self.total_work_items - self.completed_work_items
    }

    /// One-line summary for logs
    pub fn compact_summary(&self) -> String {
        format!(
            "{} arrived, {} delivered ({}), mean throughput {}, mean waiting {}",
            self.total_work_items,
            self.completed_work_items,
            fmt_optional(self.percentage_completed, "%"),
            fmt_optional(self.mean_throughput, "h"),
            fmt_optional(self.mean_waiting, "h"),
        )
    }
}

fn fmt_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, unit),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run {} ===", self.run_id)?;
        writeln!(f, "Prescriptions arrived:   {}", self.total_work_items)?;
        writeln!(f, "Prescriptions delivered: {}", self.completed_work_items)?;
        writeln!(f, "Completed:               {}", fmt_optional(self.percentage_completed, "%"))?;
        writeln!(f, "Mean throughput time:    {}", fmt_optional(self.mean_throughput, " h"))?;
        writeln!(f, "Mean waiting time:       {}", fmt_optional(self.mean_waiting, " h"))?;
        write!(f, "Pickup cycles:           {} ({} empty)", self.pickup_cycles, self.empty_pickups)
    }
}

/// Engine-level figures about how a run executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatistics {
    /// Events dispatched before the horizon
    pub events_dispatched: u64,
    /// Events left in the queue at the horizon
    pub events_pending: usize,
    /// Simulation time when the run stopped
    pub final_time: f64,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub wall_clock: Duration,
}

impl RuntimeStatistics {
    /// Dispatch rate in events per wall-clock second
    pub fn events_per_second(&self) -> f64 {
        let secs = self.wall_clock.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.events_dispatched as f64 / secs
        }
    }
}
