//! Error types and handling
//!
//! This module contains the error type shared by the simulation core and its
//! export layer. Export failures keep their I/O, CSV or JSON cause. The core
//! has no recoverable errors: a broken invariant aborts the run and surfaces
//! here as [`SimulationError::InvariantViolation`].

use crate::calendar::ScheduleError;
use crate::types::ConfigValidationError;
use thiserror::Error;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A model invariant was broken; the run cannot continue
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A recurring schedule stopped increasing
    #[error("Schedule error: {0}")]
    ScheduleError(#[from] ScheduleError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create an invariant violation
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Whether the error means the model itself is inconsistent
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationError::InvariantViolation(_) | SimulationError::ScheduleError(_))
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::InvariantViolation(_) => "Invariant",
            SimulationError::ScheduleError(_) => "Schedule",
            SimulationError::IoError(_) => "IO",
            SimulationError::CsvError(_) => "CSV",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
