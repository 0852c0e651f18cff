//! Dispensary Delivery Simulator
//!
//! A discrete-event simulation of a hospital pharmacy dispensary over one
//! week: prescriptions arrive during opening hours, pass four staffed
//! processing stages, wait in a holding store and are collected by couriers at
//! scheduled pickup times for delivery to the wards.
//!
//! # Overview
//!
//! Every prescription is timestamped at each milestone of its journey, so a
//! run yields per-prescription waiting times, time spent in the dispensary and
//! arrival-to-delivery throughput, plus a summary of the whole week.
//!
//! ## Key Features
//!
//! - **Weekly Calendar**: weekday and weekend opening hours; work left
//!   unfinished at closing time carries over to the next opening
//! - **Staffed Stages**: verification, labelling, dispensing and final check,
//!   each with a FIFO queue in front of a finite staff group
//! - **Scheduled Pickups**: concurrent couriers drain the holding store at
//!   fixed times of day and deliver the batch after a random transport time
//! - **Reproducible Runs**: seeded stochastic sampling or fully deterministic
//!   durations
//! - **Export**: per-prescription and pickup tables as CSV, summary as JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use dispensary_delivery_simulator::*;
//!
//! let parameters = RunParameters {
//!     num_pharmacists: 2,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let outcome = SimulationOrchestrator::new(parameters)?.run()?;
//! println!("{}", outcome.summary);
//! assert!(outcome.summary.total_work_items > 0);
//! # Ok::<(), SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, stages and states, run parameters
//! - [`calendar`]: Opening hours, recurring schedules and the closed-time adjuster
//! - [`dispensary`]: Staff pools and the holding store
//! - [`simulation`]: Event engine, processes, metrics, orchestration and export
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Calendar   │    │ Dispensary  │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Opening     │    │ Resource    │
//! │ Stages      │    │ Schedules   │    │ Pools       │
//! │ Parameters  │    │ Adjuster    │    │ Store       │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌──────┴───────────────────┴───────────────────┴──────┐
//! │                      Simulation                     │
//! │                                                     │
//! │  Clock ──► Context ──► Workflow / Arrivals / Pickup │
//! │                │                                    │
//! │                ▼                                    │
//! │          Metrics ──► Summary ──► Export             │
//! └─────────────────────────────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod calendar;
pub mod dispensary;
pub mod simulation;
pub mod types;

// Core types and identifiers
pub use types::{
    AdjustmentAnchor, CliArgs, ConfigError, ConfigValidationError, PrescriptionId,
    PrescriptionState, RunId, RunParameters, SamplingMode, Stage,
};

// Calendar
pub use calendar::{adjust, OpeningHours, WeekCalendar};

// Shared resources
pub use dispensary::{HoldingStore, ResourcePool};

// Simulation types and functionality
pub use simulation::{
    export_outcome, DispensaryContext, ExportPaths, LoggingConfig, MetricsLog, PrescriptionRecord,
    PrescriptionRow, PickupAuditRow, RunSummary, RuntimeStatistics, SimulationClock,
    SimulationError, SimulationOrchestrator, SimulationOutcome, SimulationResult,
};
