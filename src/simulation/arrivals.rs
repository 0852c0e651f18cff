//! Arrival generator
//!
//! Prescriptions only arrive while the dispensary is open. At each shift
//! opening the generator spawns one prescription, waits an exponential
//! inter-arrival gap, and keeps spawning until the clock has passed the shift's
//! closing time. It then sleeps until the next shift opening.

use crate::simulation::context::DispensaryContext;
use crate::simulation::engine::{EventKind, SimulationClock};
use crate::simulation::error::SimulationResult;
use tracing::debug;

impl DispensaryContext {
    /// Schedule the generator's wake-up at the first shift opening
    pub(crate) fn start_arrivals(&mut self, clock: &mut SimulationClock) -> SimulationResult<()> {
        let shift = self.shifts.first_shift_opening_at_or_after(clock.now());
        let (open, _) = self.shifts.shift(shift);
        clock.schedule_at(open, EventKind::ShiftOpens { shift })
    }

    pub(crate) fn on_shift_opens(&mut self, clock: &mut SimulationClock, shift: u64) -> SimulationResult<()> {
        let (open, close) = self.shifts.shift(shift);
        crate::sim_event!(debug, clock.now(), "shift opened", shift = shift, open = open, close = close);
        self.spawn_and_wait(clock, shift)
    }

    pub(crate) fn on_next_arrival(&mut self, clock: &mut SimulationClock, shift: u64) -> SimulationResult<()> {
        let (_, close) = self.shifts.shift(shift);
        if clock.now() <= close {
            return self.spawn_and_wait(clock, shift);
        }

        // Long gaps can overshoot whole shifts; resume at the first opening still ahead
        let next = self.shifts.first_shift_opening_at_or_after(clock.now());
        let (open, _) = self.shifts.shift(next);
        if next > shift + 1 {
            debug!(from = shift, to = next, "arrival gap skipped shifts");
        }
        clock.schedule_at(open, EventKind::ShiftOpens { shift: next })
    }

    fn spawn_and_wait(&mut self, clock: &mut SimulationClock, shift: u64) -> SimulationResult<()> {
        self.spawn_prescription(clock)?;
        let gap = self.sampler.exponential(self.params.interarrival_time);
        clock.schedule_in(gap, EventKind::NextArrival { shift })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sampler::DeterministicSampler;
    use crate::types::{PrescriptionId, RunParameters};

    fn context(interarrival_time: f64) -> DispensaryContext {
        let params = RunParameters { interarrival_time, ..Default::default() };
        DispensaryContext::new(params, Box::new(DeterministicSampler)).unwrap()
    }

    fn run(ctx: &mut DispensaryContext, horizon: f64) {
        let mut clock = SimulationClock::new(horizon);
        ctx.start_arrivals(&mut clock).unwrap();
        clock.run(ctx).unwrap();
    }

    #[test]
    fn test_arrivals_only_within_shift() {
        let mut ctx = context(1.0);
        run(&mut ctx, 24.0);

        // Monday 09:00 .. 17:00 inclusive, one per hour
        assert_eq!(ctx.metrics().len(), 9);
        let arrivals: Vec<f64> = ctx.metrics().iter().map(|row| row.arrival).collect();
        assert_eq!(arrivals.first(), Some(&9.0));
        assert_eq!(arrivals.last(), Some(&17.0));
    }

    #[test]
    fn test_arrival_at_close_is_spawned() {
        let mut ctx = context(8.5);
        run(&mut ctx, 24.0);
        // 09:00 and exactly 17:30
        let arrivals: Vec<f64> = ctx.metrics().iter().map(|row| row.arrival).collect();
        assert_eq!(arrivals, vec![9.0, 17.5]);
    }

    #[test]
    fn test_next_day_resumes_at_opening() {
        let mut ctx = context(4.0);
        run(&mut ctx, 48.0);
        let arrivals: Vec<f64> = ctx.metrics().iter().map(|row| row.arrival).collect();
        assert_eq!(arrivals, vec![9.0, 13.0, 17.0, 33.0, 37.0, 41.0]);
    }

    #[test]
    fn test_long_gap_skips_shifts() {
        let mut ctx = context(50.0);
        run(&mut ctx, 168.0);
        // 09:00 Mon, then 59:00 (Wed 11:00, after Wednesday's opening), so Thursday 09:00
        let arrivals: Vec<f64> = ctx.metrics().iter().map(|row| row.arrival).collect();
        assert_eq!(arrivals[0], 9.0);
        assert_eq!(arrivals[1], 3.0 * 24.0 + 9.0);
    }

    #[test]
    fn test_infinite_gap_spawns_only_at_opening() {
        let mut ctx = context(f64::INFINITY);
        let mut clock = SimulationClock::new(168.0);
        ctx.start_arrivals(&mut clock).unwrap();
        clock.run(&mut ctx).unwrap();
        assert_eq!(ctx.metrics().len(), 1);
        assert!(ctx.metrics().get(PrescriptionId::FIRST).is_some());
    }
}
