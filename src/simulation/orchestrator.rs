//! Main simulation orchestrator
//!
//! This module contains the SimulationOrchestrator, which wires the context,
//! the clock and the processes together and runs one week of dispensary work.

use crate::simulation::context::DispensaryContext;
use crate::simulation::engine::{EventKind, SimulationClock};
use crate::simulation::metrics::{MetricsLog, PickupAuditRow, PrescriptionRow};
use crate::simulation::sampler::{sampler_for, Sampler};
use crate::simulation::statistics::{RunSummary, RuntimeStatistics};
use crate::simulation::SimulationResult;
use crate::types::config::model::RUN_HORIZON_HOURS;
use crate::types::{RunId, RunParameters};
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Headline figures merged with the parameters
    pub summary: RunSummary,
    /// Engine-level execution figures
    pub runtime: RuntimeStatistics,
    /// Per-prescription timestamps
    pub metrics: MetricsLog,
    /// One row per pickup cycle
    pub pickup_audit: Vec<PickupAuditRow>,
    /// Prescriptions per lifecycle state at the horizon
    pub final_states: BTreeMap<String, usize>,
}

impl SimulationOutcome {
    /// Run identifier
    pub fn run_id(&self) -> RunId {
        self.summary.run_id
    }

    /// Flat per-prescription table for export
    pub fn prescription_rows(&self) -> Vec<PrescriptionRow> {
        self.metrics.export_rows(
            self.summary.parameters.average_step_duration,
            self.summary.parameters.interarrival_time,
        )
    }
}

/// Main simulation orchestrator that coordinates all components
#[derive(Debug)]
pub struct SimulationOrchestrator {
    /// Parameters of the run
    parameters: RunParameters,
    /// Identifier stamped on the results
    run_id: RunId,
    /// Whether the shift-driven arrival generator runs
    arrival_generator: bool,
    /// Extra arrivals at fixed instants
    injected_arrivals: Vec<f64>,
    /// Sampler overriding the one selected by the parameters
    sampler: Option<Box<dyn Sampler>>,
}

impl SimulationOrchestrator {
    /// Create a new simulation orchestrator
    #[instrument(skip(parameters), fields(seed = ?parameters.seed, sampling = %parameters.sampling))]
    pub fn new(parameters: RunParameters) -> SimulationResult<Self> {
        parameters.validate()?;
        let run_id = RunId::new();
        info!(
            "Initializing dispensary simulation {} with staffing {:?} and {} couriers",
            run_id,
            parameters.staffing(),
            parameters.pickup_instances
        );

        Ok(Self {
            parameters,
            run_id,
            arrival_generator: true,
            injected_arrivals: Vec::new(),
            sampler: None,
        })
    }

    /// Use a fixed run identifier
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Switch off the shift-driven arrival generator
    pub fn without_arrival_generator(mut self) -> Self {
        self.arrival_generator = false;
        self
    }

    /// Add one prescription arriving at simulation time `at`
    pub fn inject_arrival(mut self, at: f64) -> Self {
        self.injected_arrivals.push(at);
        self
    }

    /// Replace the sampler selected by the parameters
    pub fn with_sampler(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Run parameters
    pub fn parameters(&self) -> &RunParameters {
        &self.parameters
    }

    /// Run identifier
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Run one week and collect the results
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn run(self) -> SimulationResult<SimulationOutcome> {
        let started_at = Utc::now();
        let wall_clock = Instant::now();

        let sampler = match self.sampler {
            Some(sampler) => sampler,
            None => sampler_for(&self.parameters),
        };
        let mut context = DispensaryContext::new(self.parameters.clone(), sampler)?;
        let mut clock = SimulationClock::new(RUN_HORIZON_HOURS);

        if self.arrival_generator {
            context.start_arrivals(&mut clock)?;
        } else {
            debug!("arrival generator disabled");
        }
        for at in &self.injected_arrivals {
            clock.schedule_at(*at, EventKind::InjectedArrival)?;
        }
        context.start_couriers(&mut clock)?;

        let dispatched = {
            let _span = crate::perf_span!("dispatch_loop", horizon = RUN_HORIZON_HOURS).entered();
            clock.run(&mut context)?
        };

        let final_states = context.state_counts();
        let runtime = RuntimeStatistics {
            events_dispatched: dispatched,
            events_pending: clock.pending(),
            final_time: clock.now(),
            started_at,
            wall_clock: wall_clock.elapsed(),
        };
        let (metrics, pickup_audit) = context.into_results();
        let summary =
            RunSummary::from_results(self.run_id, self.parameters, &metrics, &pickup_audit);

        if summary.total_work_items == 0 {
            warn!("no prescriptions arrived during the run");
        }
        info!(
            events = runtime.events_dispatched,
            "Run finished at t={}: {}",
            runtime.final_time,
            summary.compact_summary()
        );

        Ok(SimulationOutcome { summary, runtime, metrics, pickup_audit, final_states })
    }
}
