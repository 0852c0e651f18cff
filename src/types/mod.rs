//! Core types and identifiers for the dispensary simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: the per-run prescription counter identity and UUID run identifiers
//! - **Enums**: processing stages, prescription lifecycle states, configuration switches
//! - **Configuration**: run parameters with validation, file loading and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use dispensary_delivery_simulator::types::*;
//!
//! let first = PrescriptionId::FIRST;
//! assert_eq!(first.next(), PrescriptionId(2));
//!
//! let params = RunParameters {
//!     num_pharmacists: 2,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! params.validate().unwrap();
//! assert_eq!(Stage::Verification.next(), Some(Stage::Labelling));
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
