//! Prescription workflow
//!
//! Each prescription walks the same state machine:
//!
//! ```text
//! Arrived -> Verifying -> Verified -> Labelling -> Labelled -> Dispensing
//!   -> Dispensed -> FinalChecking -> FinalChecked -> Stored -> PickedUp -> Delivered
//! ```
//!
//! Every `*ing` state is entered by acquiring the stage's staff pool and left
//! when the adjusted stage duration has elapsed. After the final check the
//! prescription is placed in the holding store for the couriers.

use crate::calendar::{adjust, day_of_week, time_of_day};
use crate::dispensary::{Acquire, Permit};
use crate::simulation::context::DispensaryContext;
use crate::simulation::engine::{EventKind, SimulationClock};
use crate::simulation::error::{SimulationError, SimulationResult};
use crate::simulation::metrics::Milestone;
use crate::types::{AdjustmentAnchor, PrescriptionId, PrescriptionState, Stage};
use chrono::Weekday;
use tracing::debug;

/// One prescription in flight
#[derive(Debug)]
pub struct Prescription {
    id: PrescriptionId,
    state: PrescriptionState,
    arrival: f64,
    permit: Option<Permit>,
}

impl Prescription {
    fn new(id: PrescriptionId, arrival: f64) -> Self {
        Self { id, state: PrescriptionState::Arrived, arrival, permit: None }
    }

    /// Prescription identity
    pub fn id(&self) -> PrescriptionId {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> PrescriptionState {
        self.state
    }

    /// Arrival time
    pub fn arrival(&self) -> f64 {
        self.arrival
    }

    pub(crate) fn transition(
        &mut self,
        from: PrescriptionState,
        to: PrescriptionState,
    ) -> SimulationResult<()> {
        if self.state != from {
            return Err(SimulationError::invariant_violation(format!(
                "{} cannot move to {} from {} (expected {})",
                self.id, to, self.state, from
            )));
        }
        self.state = to;
        Ok(())
    }
}

/// State a prescription is in while queueing for `stage`
fn ready_state(stage: Stage) -> PrescriptionState {
    match stage.index() {
        0 => PrescriptionState::Arrived,
        i => Stage::ALL[i - 1].completed_state(),
    }
}

impl DispensaryContext {
    /// Create a new prescription at the current time and queue it for verification
    pub(crate) fn spawn_prescription(
        &mut self,
        clock: &mut SimulationClock,
    ) -> SimulationResult<PrescriptionId> {
        let id = self.next_id;
        self.next_id = id.next();
        let now = clock.now();

        self.metrics.open(id, now)?;
        self.prescriptions.insert(id, Prescription::new(id, now));
        crate::sim_event!(debug, now, "prescription arrived", prescription = id.value());

        self.request_stage(clock, id, Stage::Verification)?;
        Ok(id)
    }

    fn request_stage(
        &mut self,
        clock: &mut SimulationClock,
        id: PrescriptionId,
        stage: Stage,
    ) -> SimulationResult<()> {
        match self.pools[stage.index()].acquire(id)? {
            Acquire::Granted(permit) => self.start_stage(clock, id, stage, permit),
            Acquire::Queued { position } => {
                debug!(
                    prescription = id.value(),
                    %stage,
                    position,
                    "waiting for {}",
                    stage.staff_group()
                );
                Ok(())
            }
        }
    }

    fn start_stage(
        &mut self,
        clock: &mut SimulationClock,
        id: PrescriptionId,
        stage: Stage,
        permit: Permit,
    ) -> SimulationResult<()> {
        let now = clock.now();
        let anchor = self.params.adjustment_anchor;
        let prescription = self.prescription_mut(id)?;
        prescription.transition(ready_state(stage), stage.active_state())?;
        prescription.permit = Some(permit);
        let arrival = prescription.arrival;

        self.metrics.record(id, Milestone::StageStarted(stage), now)?;

        let raw = self.sampler.exponential(self.params.average_step_duration);
        if raw.is_nan() || raw < 0.0 {
            return Err(SimulationError::invariant_violation(format!(
                "{} drew step duration {} for {}",
                id, raw, stage
            )));
        }
        let elapsed = self.stage_duration(raw, now, arrival, anchor);
        if elapsed.is_nan() || elapsed < raw {
            return Err(SimulationError::invariant_violation(format!(
                "{} adjusted {} for {} to {}",
                id, raw, stage, elapsed
            )));
        }

        debug!(prescription = id.value(), %stage, raw, elapsed, "stage started");
        clock.schedule_in(elapsed, EventKind::StageFinished { prescription: id, stage })
    }

    /// Calendar time a stage takes for `raw` hours of work starting at `now`
    fn stage_duration(&self, raw: f64, now: f64, arrival: f64, anchor: AdjustmentAnchor) -> f64 {
        let (closed, tod, day): (f64, f64, Weekday) = match anchor {
            AdjustmentAnchor::Arrival => (0.0, time_of_day(arrival), day_of_week(arrival)),
            AdjustmentAnchor::StageStart => {
                let closed = self.calendar.closed_time_until_open(now);
                let start = now + closed;
                (closed, time_of_day(start), day_of_week(start))
            }
        };
        closed + adjust(&self.calendar, raw, tod, day)
    }

    /// A stage's work is done: free the slot, then move on
    pub(crate) fn finish_stage(
        &mut self,
        clock: &mut SimulationClock,
        id: PrescriptionId,
        stage: Stage,
    ) -> SimulationResult<()> {
        let now = clock.now();
        let prescription = self.prescription_mut(id)?;
        prescription.transition(stage.active_state(), stage.completed_state())?;
        let permit = prescription.permit.take().ok_or_else(|| {
            SimulationError::invariant_violation(format!("{} finished {} without a slot", id, stage))
        })?;
        self.metrics.record(id, Milestone::StageFinished(stage), now)?;

        if let Some((waiter, permit)) = self.pools[stage.index()].release(permit)? {
            self.start_stage(clock, waiter, stage, permit)?;
        }

        match stage.next() {
            Some(next) => self.request_stage(clock, id, next),
            None => self.deposit(clock, id),
        }
    }

    fn deposit(&mut self, clock: &mut SimulationClock, id: PrescriptionId) -> SimulationResult<()> {
        let now = clock.now();
        self.prescription_mut(id)?
            .transition(PrescriptionState::FinalChecked, PrescriptionState::Stored)?;
        self.metrics.record(id, Milestone::PutInStore, now)?;
        if let Some((never, _)) = self.store.put(id) {
            match never {}
        }
        crate::sim_event!(
            debug,
            now,
            "prescription stored",
            prescription = id.value(),
            in_store = self.store.len()
        );
        Ok(())
    }
}
