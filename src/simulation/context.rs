//! Simulation context
//!
//! Owns every piece of mutable run state: the staff pools, the holding store,
//! the metrics log, the prescription counter and the sampler. Processes never
//! touch global state; they receive the context through the event dispatch.

use crate::calendar::{ScheduleCursor, ShiftSchedule, TransportSchedule, WeekCalendar};
use crate::dispensary::{HoldingStore, ResourcePool};
use crate::simulation::engine::{EventHandler, EventKind, ScheduledEvent, SimulationClock};
use crate::simulation::error::{SimulationError, SimulationResult};
use crate::simulation::metrics::{MetricsLog, PickupAuditRow};
use crate::simulation::pickup::Courier;
use crate::simulation::sampler::Sampler;
use crate::simulation::workflow::Prescription;
use crate::types::{PrescriptionId, PrescriptionState, RunParameters, Stage};
use std::collections::BTreeMap;
use std::convert::Infallible;

/// Nobody blocks on the holding store in this model; couriers drain it.
pub type PrescriptionStore = HoldingStore<PrescriptionId, Infallible>;

/// Mutable state shared by all processes of one run
#[derive(Debug)]
pub struct DispensaryContext {
    pub(crate) params: RunParameters,
    pub(crate) calendar: WeekCalendar,
    pub(crate) shifts: ShiftSchedule,
    pub(crate) pools: [ResourcePool<PrescriptionId>; 4],
    pub(crate) store: PrescriptionStore,
    pub(crate) metrics: MetricsLog,
    pub(crate) pickup_audit: Vec<PickupAuditRow>,
    pub(crate) sampler: Box<dyn Sampler>,
    pub(crate) next_id: PrescriptionId,
    pub(crate) prescriptions: BTreeMap<PrescriptionId, Prescription>,
    pub(crate) transport: ScheduleCursor<TransportSchedule>,
    pub(crate) couriers: Vec<Courier>,
}

impl DispensaryContext {
    /// Build the context for a validated parameter set
    pub fn new(params: RunParameters, sampler: Box<dyn Sampler>) -> SimulationResult<Self> {
        let calendar = WeekCalendar::new(params.weekday_opening_hours, params.weekend_opening_hours);
        let [pharmacists, labellers, dispensers, final_checkers] = params.staffing();
        let pools = [
            ResourcePool::new(Stage::Verification.staff_group(), pharmacists)?,
            ResourcePool::new(Stage::Labelling.staff_group(), labellers)?,
            ResourcePool::new(Stage::Dispensing.staff_group(), dispensers)?,
            ResourcePool::new(Stage::FinalCheck.staff_group(), final_checkers)?,
        ];
        let transport = ScheduleCursor::new(TransportSchedule::from_lists(
            &params.weekday_pickup_times,
            &params.weekend_pickup_times,
        ));
        let couriers = (0..params.pickup_instances).map(Courier::new).collect();

        Ok(Self {
            calendar,
            shifts: ShiftSchedule::new(calendar),
            pools,
            store: HoldingStore::new(),
            metrics: MetricsLog::new(),
            pickup_audit: Vec::new(),
            sampler,
            next_id: PrescriptionId::FIRST,
            prescriptions: BTreeMap::new(),
            transport,
            couriers,
            params,
        })
    }

    /// Run parameters
    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Opening-hours calendar
    pub fn calendar(&self) -> &WeekCalendar {
        &self.calendar
    }

    /// Pool serving a stage
    pub fn pool(&self, stage: Stage) -> &ResourcePool<PrescriptionId> {
        &self.pools[stage.index()]
    }

    /// Holding store
    pub fn store(&self) -> &PrescriptionStore {
        &self.store
    }

    /// Metrics recorded so far
    pub fn metrics(&self) -> &MetricsLog {
        &self.metrics
    }

    /// Pickup audit rows recorded so far
    pub fn pickup_audit(&self) -> &[PickupAuditRow] {
        &self.pickup_audit
    }

    /// Current lifecycle state of a prescription
    pub fn state_of(&self, id: PrescriptionId) -> Option<PrescriptionState> {
        self.prescriptions.get(&id).map(|p| p.state())
    }

    /// Number of prescriptions in each lifecycle state
    pub fn state_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for prescription in self.prescriptions.values() {
            *counts.entry(prescription.state().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Consume the context, keeping the recorded results
    pub fn into_results(self) -> (MetricsLog, Vec<PickupAuditRow>) {
        (self.metrics, self.pickup_audit)
    }

    pub(crate) fn prescription_mut(&mut self, id: PrescriptionId) -> SimulationResult<&mut Prescription> {
        self.prescriptions.get_mut(&id).ok_or_else(|| {
            SimulationError::invariant_violation(format!("{} is not in the dispensary", id))
        })
    }
}

impl EventHandler for DispensaryContext {
    fn handle(&mut self, clock: &mut SimulationClock, event: ScheduledEvent) -> SimulationResult<()> {
        match event.kind {
            EventKind::ShiftOpens { shift } => self.on_shift_opens(clock, shift),
            EventKind::NextArrival { shift } => self.on_next_arrival(clock, shift),
            EventKind::InjectedArrival => self.spawn_prescription(clock).map(|_| ()),
            EventKind::StageFinished { prescription, stage } => {
                self.finish_stage(clock, prescription, stage)
            }
            EventKind::PickupDue { courier } => self.on_pickup_due(clock, courier),
            EventKind::DeliveryDue { courier } => self.on_delivery_due(clock, courier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sampler::DeterministicSampler;

    #[test]
    fn test_context_from_parameters() {
        let params = RunParameters {
            num_pharmacists: 2,
            num_final_checkers: 5,
            pickup_instances: 3,
            ..Default::default()
        };
        let ctx = DispensaryContext::new(params, Box::new(DeterministicSampler)).unwrap();

        assert_eq!(ctx.pool(Stage::Verification).capacity(), 2);
        assert_eq!(ctx.pool(Stage::Verification).name(), "pharmacists");
        assert_eq!(ctx.pool(Stage::FinalCheck).capacity(), 5);
        assert_eq!(ctx.couriers.len(), 3);
        assert!(ctx.metrics().is_empty());
        assert!(ctx.store().is_empty());
        assert_eq!(ctx.next_id, PrescriptionId::FIRST);
    }

    #[test]
    fn test_zero_staff_is_an_invariant_violation() {
        let params = RunParameters { num_dispensers: 0, ..Default::default() };
        let err = DispensaryContext::new(params, Box::new(DeterministicSampler)).unwrap_err();
        assert!(err.is_invariant_violation());
    }
}
