//! Discrete-event engine
//!
//! A single virtual clock and a min-heap of pending events. Every process in
//! the model (arrival generator, prescription workflows, couriers) suspends by
//! registering an event here and is resumed when the clock reaches it.

use crate::simulation::error::{SimulationError, SimulationResult};
use crate::types::{PrescriptionId, Stage};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// What happens when an event comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The n-th shift opens; the arrival generator starts spawning
    ShiftOpens {
        /// Shift (day) index
        shift: u64,
    },
    /// The inter-arrival wait within a shift has elapsed
    NextArrival {
        /// Shift (day) index the generator is working
        shift: u64,
    },
    /// A prescription injected at a fixed instant
    InjectedArrival,
    /// A prescription finished working a stage
    StageFinished {
        /// The prescription being worked
        prescription: PrescriptionId,
        /// The stage that finished
        stage: Stage,
    },
    /// A courier reached its claimed pickup instant
    PickupDue {
        /// Courier index
        courier: usize,
    },
    /// A courier's transport delay has elapsed
    DeliveryDue {
        /// Courier index
        courier: usize,
    },
}

/// An event together with its due time and scheduling sequence number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    /// Simulation time the event is due
    pub time: f64,
    /// Order in which the event was scheduled; breaks ties FIFO
    pub seq: u64,
    /// The event itself
    pub kind: EventKind,
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the earliest time, then the lowest seq
        other.time.total_cmp(&self.time).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Receives every event the clock dispatches
pub trait EventHandler {
    /// Handle one due event; may schedule further events on `clock`
    fn handle(&mut self, clock: &mut SimulationClock, event: ScheduledEvent) -> SimulationResult<()>;
}

/// Virtual clock with a bounded horizon
#[derive(Debug)]
pub struct SimulationClock {
    now: f64,
    horizon: f64,
    next_seq: u64,
    dispatched: u64,
    events: BinaryHeap<ScheduledEvent>,
}

impl SimulationClock {
    /// Clock at time 0 that stops before `horizon`
    pub fn new(horizon: f64) -> Self {
        Self { now: 0.0, horizon, next_seq: 0, dispatched: 0, events: BinaryHeap::new() }
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// End of the run
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Schedule an event at an absolute time
    ///
    /// Times in the past and NaN are rejected. An infinite time is accepted and
    /// simply never comes due.
    pub fn schedule_at(&mut self, time: f64, kind: EventKind) -> SimulationResult<()> {
        if time.is_nan() || time < self.now {
            return Err(SimulationError::invariant_violation(format!(
                "cannot schedule {:?} at {} (clock is at {})",
                kind, time, self.now
            )));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent { time, seq, kind });
        Ok(())
    }

    /// Schedule an event `delay` hours from now
    pub fn schedule_in(&mut self, delay: f64, kind: EventKind) -> SimulationResult<()> {
        if delay.is_nan() || delay < 0.0 {
            return Err(SimulationError::invariant_violation(format!(
                "negative or undefined delay {} for {:?}",
                delay, kind
            )));
        }
        self.schedule_at(self.now + delay, kind)
    }

    /// Pop the earliest event due before the horizon and advance the clock to it
    ///
    /// Once the next event lies at or beyond the horizon, the clock moves to the
    /// horizon and nothing more is dispatched.
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        match self.events.peek() {
            Some(event) if event.time < self.horizon => {}
            _ => {
                self.now = self.now.max(self.horizon);
                return None;
            }
        }
        let event = self.events.pop()?;
        self.now = event.time;
        self.dispatched += 1;
        Some(event)
    }

    /// Dispatch events to `handler` until the horizon; returns the number dispatched
    pub fn run<H: EventHandler>(&mut self, handler: &mut H) -> SimulationResult<u64> {
        let start = self.dispatched;
        while let Some(event) = self.pop_next() {
            trace!(time = event.time, seq = event.seq, kind = ?event.kind, "dispatch");
            handler.handle(self, event)?;
        }
        Ok(self.dispatched - start)
    }

    /// Events still waiting, including those beyond the horizon
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Events dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(f64, EventKind)>,
    }

    impl EventHandler for Recorder {
        fn handle(&mut self, clock: &mut SimulationClock, event: ScheduledEvent) -> SimulationResult<()> {
            self.seen.push((clock.now(), event.kind));
            Ok(())
        }
    }

    #[test]
    fn test_events_pop_in_time_order() {
        let mut clock = SimulationClock::new(168.0);
        clock.schedule_at(10.0, EventKind::PickupDue { courier: 0 }).unwrap();
        clock.schedule_at(5.0, EventKind::PickupDue { courier: 1 }).unwrap();
        clock.schedule_at(20.0, EventKind::PickupDue { courier: 2 }).unwrap();

        assert_eq!(clock.pop_next().unwrap().time, 5.0);
        assert_eq!(clock.now(), 5.0);
        assert_eq!(clock.pop_next().unwrap().time, 10.0);
        assert_eq!(clock.pop_next().unwrap().time, 20.0);
        assert!(clock.pop_next().is_none());
        assert_eq!(clock.now(), 168.0);
    }

    #[test]
    fn test_ties_resolve_in_scheduling_order() {
        let mut clock = SimulationClock::new(168.0);
        for courier in 0..5 {
            clock.schedule_at(12.0, EventKind::DeliveryDue { courier }).unwrap();
        }
        let mut recorder = Recorder::default();
        assert_eq!(clock.run(&mut recorder).unwrap(), 5);
        let order: Vec<_> = recorder.seen.iter().map(|(_, kind)| *kind).collect();
        let expected: Vec<_> = (0..5).map(|courier| EventKind::DeliveryDue { courier }).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_horizon_is_exclusive() {
        let mut clock = SimulationClock::new(168.0);
        clock.schedule_at(167.9, EventKind::InjectedArrival).unwrap();
        clock.schedule_at(168.0, EventKind::InjectedArrival).unwrap();
        clock.schedule_at(f64::INFINITY, EventKind::NextArrival { shift: 0 }).unwrap();

        let mut recorder = Recorder::default();
        assert_eq!(clock.run(&mut recorder).unwrap(), 1);
        assert_eq!(clock.now(), 168.0);
        assert_eq!(clock.pending(), 2);
    }

    #[test]
    fn test_rejects_past_and_nan() {
        let mut clock = SimulationClock::new(168.0);
        clock.schedule_at(3.0, EventKind::InjectedArrival).unwrap();
        clock.pop_next();

        assert!(clock.schedule_at(2.0, EventKind::InjectedArrival).is_err());
        assert!(clock.schedule_at(f64::NAN, EventKind::InjectedArrival).is_err());
        assert!(clock.schedule_in(-0.5, EventKind::InjectedArrival).is_err());
        assert!(clock.schedule_in(0.0, EventKind::InjectedArrival).is_ok());
    }
}
