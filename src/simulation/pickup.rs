//! Pickup and delivery couriers
//!
//! Couriers share one cursor over the transport schedule. Each courier claims
//! the next unclaimed pickup instant, drains the holding store when it comes
//! due, spends a normally distributed transport time on the road, stamps the
//! delivery on the whole batch and then claims the next instant.

use crate::calendar::Schedule;
use crate::simulation::context::DispensaryContext;
use crate::simulation::engine::{EventKind, SimulationClock};
use crate::simulation::error::{SimulationError, SimulationResult};
use crate::simulation::metrics::{Milestone, PickupAuditRow};
use crate::types::{PrescriptionId, PrescriptionState};
use tracing::{debug, warn};

/// One pickup-and-delivery process
#[derive(Debug, Clone, PartialEq)]
pub struct Courier {
    index: usize,
    batch: Vec<PrescriptionId>,
    trips: u64,
}

impl Courier {
    /// Idle courier with the given index
    pub fn new(index: usize) -> Self {
        Self { index, batch: Vec::new(), trips: 0 }
    }

    /// Courier index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Prescriptions currently on the road with this courier
    pub fn batch(&self) -> &[PrescriptionId] {
        &self.batch
    }

    /// Completed deliveries (including empty ones)
    pub fn trips(&self) -> u64 {
        self.trips
    }
}

impl DispensaryContext {
    /// Every courier claims its first pickup instant
    pub(crate) fn start_couriers(&mut self, clock: &mut SimulationClock) -> SimulationResult<()> {
        if self.transport.schedule().period() == 0 {
            warn!("no pickup times configured; stored prescriptions will never be delivered");
            return Ok(());
        }
        for courier in 0..self.couriers.len() {
            self.claim_next_pickup(clock, courier)?;
        }
        Ok(())
    }

    fn claim_next_pickup(&mut self, clock: &mut SimulationClock, courier: usize) -> SimulationResult<()> {
        let Some(instant) = self.transport.advance()? else {
            return Ok(());
        };
        // A courier back late from a long trip picks up at once
        let due = instant.max(clock.now());
        debug!(courier, instant, due, "pickup claimed");
        clock.schedule_at(due, EventKind::PickupDue { courier })
    }

    pub(crate) fn on_pickup_due(&mut self, clock: &mut SimulationClock, courier: usize) -> SimulationResult<()> {
        let now = clock.now();
        let items_before = self.store.len();
        let batch = self.store.drain();

        for id in &batch {
            self.prescription_mut(*id)?
                .transition(PrescriptionState::Stored, PrescriptionState::PickedUp)?;
            self.metrics.record(*id, Milestone::PickedUp, now)?;
        }
        self.pickup_audit.push(PickupAuditRow {
            courier,
            time_before_pickup: now,
            items_in_store_before: items_before,
            time_after_pickup: now,
            items_in_store_after: self.store.len(),
        });
        crate::sim_event!(debug, now, "pickup", courier = courier, drained = batch.len());

        let transport = self
            .sampler
            .normal(self.params.average_transport_duration, self.params.transport_duration_std_dev);
        if transport.is_nan() {
            return Err(SimulationError::invariant_violation(format!(
                "courier {} drew an undefined transport time",
                courier
            )));
        }
        let slot = self.courier_mut(courier)?;
        slot.batch = batch;
        clock.schedule_in(transport.max(0.0), EventKind::DeliveryDue { courier })
    }

    pub(crate) fn on_delivery_due(&mut self, clock: &mut SimulationClock, courier: usize) -> SimulationResult<()> {
        let now = clock.now();
        let slot = self.courier_mut(courier)?;
        let batch = std::mem::take(&mut slot.batch);
        slot.trips += 1;

        for id in &batch {
            self.prescription_mut(*id)?
                .transition(PrescriptionState::PickedUp, PrescriptionState::Delivered)?;
            self.metrics.record(*id, Milestone::Delivered, now)?;
        }
        crate::sim_event!(debug, now, "delivery", courier = courier, delivered = batch.len());

        self.claim_next_pickup(clock, courier)
    }

    fn courier_mut(&mut self, courier: usize) -> SimulationResult<&mut Courier> {
        self.couriers.get_mut(courier).ok_or_else(|| {
            SimulationError::invariant_violation(format!("no courier with index {}", courier))
        })
    }

    /// Couriers of this run
    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sampler::DeterministicSampler;
    use crate::types::RunParameters;

    fn context(params: RunParameters) -> DispensaryContext {
        DispensaryContext::new(params, Box::new(DeterministicSampler)).unwrap()
    }

    #[test]
    fn test_couriers_claim_distinct_instants() {
        let mut ctx = context(RunParameters { pickup_instances: 3, ..Default::default() });
        let mut clock = SimulationClock::new(24.0);
        ctx.start_couriers(&mut clock).unwrap();
        clock.run(&mut ctx).unwrap();

        // Monday 10, 12, 15, 17: each instant served exactly once
        let times: Vec<f64> = ctx.pickup_audit().iter().map(|row| row.time_before_pickup).collect();
        assert_eq!(times, vec![10.0, 12.0, 15.0, 17.0]);
        assert!(ctx.pickup_audit().iter().all(|row| row.items_in_store_after == 0));
        let trips: u64 = ctx.couriers().iter().map(|c| c.trips()).sum();
        assert_eq!(trips, 4);
    }

    #[test]
    fn test_pickup_and_delivery_stamp_the_batch() {
        let params = RunParameters {
            average_step_duration: 0.2,
            average_transport_duration: 0.5,
            pickup_instances: 1,
            ..Default::default()
        };
        let mut ctx = context(params);
        let mut clock = SimulationClock::new(11.0);
        clock.schedule_at(9.0, EventKind::InjectedArrival).unwrap();
        clock.schedule_at(9.0, EventKind::InjectedArrival).unwrap();
        ctx.start_couriers(&mut clock).unwrap();
        clock.run(&mut ctx).unwrap();

        for id in [PrescriptionId(1), PrescriptionId(2)] {
            let row = ctx.metrics().get(id).unwrap();
            assert_eq!(row.pickup, Some(10.0));
            assert_eq!(row.delivery, Some(10.5));
            assert_eq!(ctx.state_of(id), Some(PrescriptionState::Delivered));
        }
        assert_eq!(ctx.pickup_audit()[0].items_in_store_before, 2);
    }

    #[test]
    fn test_negative_transport_is_clamped() {
        let params = RunParameters {
            average_transport_duration: -2.0,
            pickup_instances: 1,
            ..Default::default()
        };
        let mut ctx = context(params);
        let mut clock = SimulationClock::new(11.0);
        ctx.start_couriers(&mut clock).unwrap();
        clock.run(&mut ctx).unwrap();
        assert_eq!(ctx.couriers()[0].trips(), 1);
    }

    #[test]
    fn test_empty_schedule_never_picks_up() {
        let params = RunParameters {
            weekday_pickup_times: vec![],
            weekend_pickup_times: vec![],
            ..Default::default()
        };
        let mut ctx = context(params);
        let mut clock = SimulationClock::new(168.0);
        ctx.start_couriers(&mut clock).unwrap();
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_late_courier_picks_up_immediately() {
        let params = RunParameters {
            average_transport_duration: 3.0,
            pickup_instances: 1,
            ..Default::default()
        };
        let mut ctx = context(params);
        let mut clock = SimulationClock::new(14.0);
        ctx.start_couriers(&mut clock).unwrap();
        clock.run(&mut ctx).unwrap();
        // Back at 13:00 from the 10:00 run, so the 12:00 pickup happens at 13:00
        let times: Vec<f64> = ctx.pickup_audit().iter().map(|row| row.time_before_pickup).collect();
        assert_eq!(times, vec![10.0, 13.0]);
    }
}
