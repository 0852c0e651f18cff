//! Per-prescription metrics and the pickup audit
//!
//! The [`MetricsLog`] holds one row per prescription, created at arrival and
//! filled in as the prescription moves through the dispensary. Every cell is
//! written at most once; a second write means two processes believe they own
//! the same prescription, which aborts the run.

use crate::calendar::{day_of_week, time_of_day, weekday_name};
use crate::simulation::error::{SimulationError, SimulationResult};
use crate::types::{PrescriptionId, Stage};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A timestamped point in a prescription's life after arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// A stage's pool slot was granted and work began
    StageStarted(Stage),
    /// A stage's work finished
    StageFinished(Stage),
    /// Deposited in the holding store
    PutInStore,
    /// Collected by a courier
    PickedUp,
    /// Delivered to the ward
    Delivered,
}

/// Timestamps of one prescription
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionRecord {
    /// Prescription identity
    pub id: PrescriptionId,
    /// Arrival time
    pub arrival: f64,
    /// Time of day of the arrival
    pub arrival_time_of_day: f64,
    /// Weekday of the arrival
    pub arrival_day: Weekday,
    /// Start of each stage, indexed by [`Stage::index`]
    pub stage_started: [Option<f64>; 4],
    /// End of each stage, indexed by [`Stage::index`]
    pub stage_finished: [Option<f64>; 4],
    /// Deposit into the holding store
    pub put_in_store: Option<f64>,
    /// Collection by a courier
    pub pickup: Option<f64>,
    /// Delivery to the ward
    pub delivery: Option<f64>,
}

impl PrescriptionRecord {
    fn new(id: PrescriptionId, arrival: f64) -> Self {
        Self {
            id,
            arrival,
            arrival_time_of_day: time_of_day(arrival),
            arrival_day: day_of_week(arrival),
            stage_started: [None; 4],
            stage_finished: [None; 4],
            put_in_store: None,
            pickup: None,
            delivery: None,
        }
    }

    fn cell(&mut self, milestone: Milestone) -> &mut Option<f64> {
        match milestone {
            Milestone::StageStarted(stage) => &mut self.stage_started[stage.index()],
            Milestone::StageFinished(stage) => &mut self.stage_finished[stage.index()],
            Milestone::PutInStore => &mut self.put_in_store,
            Milestone::PickedUp => &mut self.pickup,
            Milestone::Delivered => &mut self.delivery,
        }
    }

    /// Timestamp of a milestone, if reached
    pub fn time_of(&self, milestone: Milestone) -> Option<f64> {
        match milestone {
            Milestone::StageStarted(stage) => self.stage_started[stage.index()],
            Milestone::StageFinished(stage) => self.stage_finished[stage.index()],
            Milestone::PutInStore => self.put_in_store,
            Milestone::PickedUp => self.pickup,
            Milestone::Delivered => self.delivery,
        }
    }

    /// Time of day of the store deposit
    pub fn put_in_store_time_of_day(&self) -> Option<f64> {
        self.put_in_store.map(time_of_day)
    }

    /// Weekday of the store deposit
    pub fn put_in_store_day(&self) -> Option<Weekday> {
        self.put_in_store.map(day_of_week)
    }

    /// Queueing delay before a stage
    ///
    /// Measured from arrival for the first stage and from the previous stage's
    /// finish otherwise.
    pub fn waiting_for(&self, stage: Stage) -> Option<f64> {
        let started = self.stage_started[stage.index()]?;
        let ready = match stage.index() {
            0 => self.arrival,
            i => self.stage_finished[i - 1]?,
        };
        Some(started - ready)
    }

    /// Time spent in the holding store
    pub fn waiting_for_transport(&self) -> Option<f64> {
        Some(self.pickup? - self.put_in_store?)
    }

    /// Sum of the four stage waits and the transport wait
    pub fn overall_waiting(&self) -> Option<f64> {
        let mut total = self.waiting_for_transport()?;
        for stage in Stage::ALL {
            total += self.waiting_for(stage)?;
        }
        Some(total)
    }

    /// Arrival to store deposit
    pub fn process_in_dispensary(&self) -> Option<f64> {
        Some(self.put_in_store? - self.arrival)
    }

    /// Arrival to delivery
    pub fn throughput(&self) -> Option<f64> {
        Some(self.delivery? - self.arrival)
    }

    /// Whether the prescription reached the ward
    pub fn is_completed(&self) -> bool {
        self.delivery.is_some()
    }
}

/// Write-once table of prescription timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsLog {
    rows: BTreeMap<PrescriptionId, PrescriptionRecord>,
}

impl MetricsLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the row for a newly arrived prescription
    pub fn open(&mut self, id: PrescriptionId, arrival: f64) -> SimulationResult<()> {
        if self.rows.contains_key(&id) {
            return Err(SimulationError::invariant_violation(format!(
                "{} arrived twice",
                id
            )));
        }
        self.rows.insert(id, PrescriptionRecord::new(id, arrival));
        Ok(())
    }

    /// Fill one cell of a prescription's row
    pub fn record(&mut self, id: PrescriptionId, milestone: Milestone, time: f64) -> SimulationResult<()> {
        let row = self.rows.get_mut(&id).ok_or_else(|| {
            SimulationError::invariant_violation(format!("{} has no metrics row", id))
        })?;
        let cell = row.cell(milestone);
        if let Some(previous) = cell {
            return Err(SimulationError::invariant_violation(format!(
                "{} recorded {:?} twice ({} then {})",
                id, milestone, previous, time
            )));
        }
        *cell = Some(time);
        Ok(())
    }

    /// Row of one prescription
    pub fn get(&self, id: PrescriptionId) -> Option<&PrescriptionRecord> {
        self.rows.get(&id)
    }

    /// Rows in identity order
    pub fn iter(&self) -> impl Iterator<Item = &PrescriptionRecord> {
        self.rows.values()
    }

    /// Number of prescriptions that arrived
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing arrived
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of prescriptions delivered
    pub fn completed(&self) -> usize {
        self.rows.values().filter(|row| row.is_completed()).count()
    }

    /// Flat export rows, one per prescription
    pub fn export_rows(&self, average_step_duration: f64, interarrival_time: f64) -> Vec<PrescriptionRow> {
        self.rows
            .values()
            .map(|row| PrescriptionRow::from_record(row, average_step_duration, interarrival_time))
            .collect()
    }
}

/// One exported line of the prescription table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRow {
    /// Prescription counter value
    pub prescription: u64,
    /// Mean step duration of the run
    pub average_step_duration: f64,
    /// Mean inter-arrival time of the run
    pub interarrival_time: f64,
    /// Arrival time
    pub arrival_time: f64,
    /// Time of day of arrival
    pub time_of_day_of_arrival: f64,
    /// Weekday of arrival
    pub day_of_week_of_arrival: String,
    /// Verification start
    pub verification_started: Option<f64>,
    /// Verification end
    pub verification_finished: Option<f64>,
    /// Labelling start
    pub labelling_started: Option<f64>,
    /// Labelling end
    pub labelling_finished: Option<f64>,
    /// Dispensing start
    pub dispensing_started: Option<f64>,
    /// Dispensing end
    pub dispensing_finished: Option<f64>,
    /// Final check start
    pub final_check_started: Option<f64>,
    /// Final check end
    pub final_check_finished: Option<f64>,
    /// Holding store deposit
    pub put_in_store: Option<f64>,
    /// Time of day of the deposit
    pub time_of_day_of_put_in_store: Option<f64>,
    /// Weekday of the deposit
    pub day_of_week_of_put_in_store: Option<String>,
    /// Courier pickup
    pub time_of_pickup: Option<f64>,
    /// Ward delivery
    pub time_of_delivery: Option<f64>,
    /// Wait before verification
    pub waiting_for_verification: Option<f64>,
    /// Wait before labelling
    pub waiting_for_labelling: Option<f64>,
    /// Wait before dispensing
    pub waiting_for_dispensing: Option<f64>,
    /// Wait before final check
    pub waiting_for_final_check: Option<f64>,
    /// Wait in the holding store
    pub waiting_for_transport: Option<f64>,
    /// Sum of all waits
    pub overall_waiting: Option<f64>,
    /// Arrival to store deposit
    pub process_in_dispensary: Option<f64>,
    /// Arrival to delivery
    pub throughput_time: Option<f64>,
}

impl PrescriptionRow {
    fn from_record(row: &PrescriptionRecord, average_step_duration: f64, interarrival_time: f64) -> Self {
        let [verification, labelling, dispensing, final_check] = Stage::ALL;
        Self {
            prescription: row.id.value(),
            average_step_duration,
            interarrival_time,
            arrival_time: row.arrival,
            time_of_day_of_arrival: row.arrival_time_of_day,
            day_of_week_of_arrival: weekday_name(row.arrival_day).to_string(),
            verification_started: row.stage_started[0],
            verification_finished: row.stage_finished[0],
            labelling_started: row.stage_started[1],
            labelling_finished: row.stage_finished[1],
            dispensing_started: row.stage_started[2],
            dispensing_finished: row.stage_finished[2],
            final_check_started: row.stage_started[3],
            final_check_finished: row.stage_finished[3],
            put_in_store: row.put_in_store,
            time_of_day_of_put_in_store: row.put_in_store_time_of_day(),
            day_of_week_of_put_in_store: row.put_in_store_day().map(|d| weekday_name(d).to_string()),
            time_of_pickup: row.pickup,
            time_of_delivery: row.delivery,
            waiting_for_verification: row.waiting_for(verification),
            waiting_for_labelling: row.waiting_for(labelling),
            waiting_for_dispensing: row.waiting_for(dispensing),
            waiting_for_final_check: row.waiting_for(final_check),
            waiting_for_transport: row.waiting_for_transport(),
            overall_waiting: row.overall_waiting(),
            process_in_dispensary: row.process_in_dispensary(),
            throughput_time: row.throughput(),
        }
    }
}

/// Store occupancy around one pickup cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupAuditRow {
    /// Courier that served the cycle
    pub courier: usize,
    /// Time before draining
    pub time_before_pickup: f64,
    /// Items in the store before draining
    pub items_in_store_before: usize,
    /// Time after draining
    pub time_after_pickup: f64,
    /// Items in the store after draining; always zero
    pub items_in_store_after: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walked_record() -> MetricsLog {
        let id = PrescriptionId::FIRST;
        let mut log = MetricsLog::new();
        log.open(id, 10.0).unwrap();
        let mut t = 10.5;
        for stage in Stage::ALL {
            log.record(id, Milestone::StageStarted(stage), t).unwrap();
            log.record(id, Milestone::StageFinished(stage), t + 1.0).unwrap();
            t += 1.25;
        }
        log.record(id, Milestone::PutInStore, 15.25).unwrap();
        log.record(id, Milestone::PickedUp, 15.5).unwrap();
        log.record(id, Milestone::Delivered, 16.0).unwrap();
        log
    }

    #[test]
    fn test_derived_intervals() {
        let log = walked_record();
        let row = log.get(PrescriptionId::FIRST).unwrap();

        assert_eq!(row.waiting_for(Stage::Verification), Some(0.5));
        assert_eq!(row.waiting_for(Stage::Labelling), Some(0.25));
        assert_eq!(row.waiting_for(Stage::FinalCheck), Some(0.25));
        assert_eq!(row.waiting_for_transport(), Some(0.25));
        assert_eq!(row.overall_waiting(), Some(0.5 + 3.0 * 0.25 + 0.25));
        assert_eq!(row.process_in_dispensary(), Some(5.25));
        assert_eq!(row.throughput(), Some(6.0));
        assert_eq!(row.arrival_day, Weekday::Mon);
        assert_eq!(log.completed(), 1);
    }

    #[test]
    fn test_unfinished_row_has_no_totals() {
        let mut log = MetricsLog::new();
        let id = PrescriptionId(4);
        log.open(id, 33.0).unwrap();
        log.record(id, Milestone::StageStarted(Stage::Verification), 33.0).unwrap();

        let row = log.get(id).unwrap();
        assert_eq!(row.waiting_for(Stage::Verification), Some(0.0));
        assert_eq!(row.waiting_for(Stage::Labelling), None);
        assert_eq!(row.overall_waiting(), None);
        assert_eq!(row.throughput(), None);
        assert_eq!(log.completed(), 0);
    }

    #[test]
    fn test_cells_are_write_once() {
        let mut log = walked_record();
        let err = log.record(PrescriptionId::FIRST, Milestone::Delivered, 17.0).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(log.open(PrescriptionId::FIRST, 11.0).is_err());
        assert!(log.record(PrescriptionId(99), Milestone::PickedUp, 1.0).is_err());
    }

    #[test]
    fn test_export_row_columns() {
        let log = walked_record();
        let rows = log.export_rows(0.25, 5.0 / 60.0);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.prescription, 1);
        assert_eq!(row.day_of_week_of_arrival, "Monday");
        assert_eq!(row.time_of_day_of_put_in_store, Some(15.25));
        assert_eq!(row.day_of_week_of_put_in_store.as_deref(), Some("Monday"));
        assert_eq!(row.throughput_time, Some(6.0));
    }
}
