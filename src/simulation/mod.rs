//! Simulation engine, processes and results
//!
//! This module contains the discrete-event engine, the dispensary processes it
//! drives, and everything that turns a finished run into results.
//!
//! # Overview
//!
//! - **SimulationClock**: virtual time and the pending-event queue
//! - **DispensaryContext**: all mutable state of one run, shared by the processes
//! - **Workflow / arrivals / pickup**: the prescription state machine, the
//!   shift-driven arrival generator and the courier loop
//! - **MetricsLog**: write-once per-prescription timestamps and derived waits
//! - **RunSummary**: mean throughput, mean waiting and completion figures
//! - **SimulationOrchestrator**: builds a run, drives it to the horizon and
//!   returns a [`SimulationOutcome`]
//! - **SimulationError**: failures of the run and its export
//!
//! # Usage Example
//!
//! ```rust
//! use dispensary_delivery_simulator::simulation::*;
//! use dispensary_delivery_simulator::types::*;
//!
//! let parameters = RunParameters {
//!     sampling: SamplingMode::Deterministic,
//!     ..Default::default()
//! };
//!
//! // One prescription on Monday at 10:00, no generated arrivals
//! let outcome = SimulationOrchestrator::new(parameters)?
//!     .without_arrival_generator()
//!     .inject_arrival(10.0)
//!     .run()?;
//!
//! assert_eq!(outcome.summary.total_work_items, 1);
//! assert_eq!(outcome.summary.completed_work_items, 1);
//! # Ok::<(), SimulationError>(())
//! ```

pub mod arrivals;
pub mod context;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod pickup;
pub mod sampler;
pub mod statistics;
pub mod workflow;

// Re-export all public types for convenience
pub use context::*;
pub use engine::*;
pub use error::*;
pub use export::*;
pub use logging::*;
pub use metrics::*;
pub use orchestrator::*;
pub use pickup::*;
pub use sampler::*;
pub use statistics::*;
pub use workflow::*;
