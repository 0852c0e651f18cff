//! Enumeration types for the dispensary simulator
//!
//! This module contains the processing stages, the prescription lifecycle
//! states and the configuration switches used throughout the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four staffed processing stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Clinical verification by a pharmacist
    Verification,
    /// Label printing and attaching
    Labelling,
    /// Picking and assembling the medication
    Dispensing,
    /// Final accuracy check before the item leaves the dispensary
    FinalCheck,
}

impl Stage {
    /// All stages in processing order
    pub const ALL: [Stage; 4] =
        [Stage::Verification, Stage::Labelling, Stage::Dispensing, Stage::FinalCheck];

    /// The stage that follows this one, if any
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Verification => Some(Stage::Labelling),
            Stage::Labelling => Some(Stage::Dispensing),
            Stage::Dispensing => Some(Stage::FinalCheck),
            Stage::FinalCheck => None,
        }
    }

    /// Position of the stage in the pipeline (0-based)
    pub fn index(&self) -> usize {
        match self {
            Stage::Verification => 0,
            Stage::Labelling => 1,
            Stage::Dispensing => 2,
            Stage::FinalCheck => 3,
        }
    }

    /// Name of the staff group that works this stage
    pub fn staff_group(&self) -> &'static str {
        match self {
            Stage::Verification => "pharmacists",
            Stage::Labelling => "labellers",
            Stage::Dispensing => "dispensers",
            Stage::FinalCheck => "final checkers",
        }
    }

    /// Lifecycle state while the stage is being worked
    pub fn active_state(&self) -> PrescriptionState {
        match self {
            Stage::Verification => PrescriptionState::Verifying,
            Stage::Labelling => PrescriptionState::Labelling,
            Stage::Dispensing => PrescriptionState::Dispensing,
            Stage::FinalCheck => PrescriptionState::FinalChecking,
        }
    }

    /// Lifecycle state once the stage has finished
    pub fn completed_state(&self) -> PrescriptionState {
        match self {
            Stage::Verification => PrescriptionState::Verified,
            Stage::Labelling => PrescriptionState::Labelled,
            Stage::Dispensing => PrescriptionState::Dispensed,
            Stage::FinalCheck => PrescriptionState::FinalChecked,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Verification => write!(f, "Verification"),
            Stage::Labelling => write!(f, "Labelling"),
            Stage::Dispensing => write!(f, "Dispensing"),
            Stage::FinalCheck => write!(f, "Final Check"),
        }
    }
}

/// Lifecycle of a prescription from arrival to ward delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrescriptionState {
    /// Entered the dispensary system, waiting for a pharmacist
    Arrived,
    /// Being verified
    Verifying,
    /// Verified, waiting for a labeller
    Verified,
    /// Being labelled
    Labelling,
    /// Labelled, waiting for a dispenser
    Labelled,
    /// Being dispensed
    Dispensing,
    /// Dispensed, waiting for a final checker
    Dispensed,
    /// Being final-checked
    FinalChecking,
    /// Final-checked, about to enter the holding store
    FinalChecked,
    /// Waiting in the holding store for a pickup
    Stored,
    /// Collected by a courier and in transport
    PickedUp,
    /// Delivered to the ward
    Delivered,
}

impl PrescriptionState {
    /// Whether the prescription has reached its final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrescriptionState::Delivered)
    }
}

impl fmt::Display for PrescriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrescriptionState::Arrived => "Arrived",
            PrescriptionState::Verifying => "Verifying",
            PrescriptionState::Verified => "Verified",
            PrescriptionState::Labelling => "Labelling",
            PrescriptionState::Labelled => "Labelled",
            PrescriptionState::Dispensing => "Dispensing",
            PrescriptionState::Dispensed => "Dispensed",
            PrescriptionState::FinalChecking => "Final Checking",
            PrescriptionState::FinalChecked => "Final Checked",
            PrescriptionState::Stored => "Stored",
            PrescriptionState::PickedUp => "Picked Up",
            PrescriptionState::Delivered => "Delivered",
        };
        write!(f, "{}", label)
    }
}

/// Which point in time anchors the closing-time adjustment of a stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentAnchor {
    /// Every stage uses the time of day and weekday of the prescription's arrival
    #[default]
    Arrival,
    /// Each stage uses the time at which that stage actually begins
    StageStart,
}

impl fmt::Display for AdjustmentAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentAnchor::Arrival => write!(f, "arrival"),
            AdjustmentAnchor::StageStart => write!(f, "stage_start"),
        }
    }
}

impl FromStr for AdjustmentAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arrival" => Ok(AdjustmentAnchor::Arrival),
            "stage_start" | "stage-start" | "stagestart" | "stage" => {
                Ok(AdjustmentAnchor::StageStart)
            }
            _ => Err(format!("Unknown adjustment anchor: {}", s)),
        }
    }
}

/// How random durations are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Seeded exponential and normal draws
    #[default]
    Stochastic,
    /// Every draw returns the distribution mean
    Deterministic,
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingMode::Stochastic => write!(f, "stochastic"),
            SamplingMode::Deterministic => write!(f, "deterministic"),
        }
    }
}

impl FromStr for SamplingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stochastic" | "random" => Ok(SamplingMode::Stochastic),
            "deterministic" | "mean" => Ok(SamplingMode::Deterministic),
            _ => Err(format!("Unknown sampling mode: {}", s)),
        }
    }
}
