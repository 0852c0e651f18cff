//! Identifier types for the dispensary simulator
//!
//! This module contains the prescription counter identity and the UUID-based
//! run identifier used to label exported results.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Identity of a single prescription
///
/// Identities are handed out by a per-run counter starting at 1 and are never
/// reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrescriptionId(pub u64);

impl PrescriptionId {
    /// The first identity issued in every run
    pub const FIRST: PrescriptionId = PrescriptionId(1);

    /// Get the raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identity issued after this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PrescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RX_{}", self.0)
    }
}

/// Unique identifier for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in export file names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RUN_{}", self.0.simple())
    }
}

impl Serialize for RunId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("RUN_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("RUN_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(RunId(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescription_id_sequence() {
        let first = PrescriptionId::FIRST;
        assert_eq!(first.value(), 1);
        assert_eq!(first.next(), PrescriptionId(2));
        assert!(first < first.next());
        assert_eq!(first.to_string(), "RX_1");
    }

    #[test]
    fn test_prescription_id_serializes_as_number() {
        let json = serde_json::to_string(&PrescriptionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_run_id_round_trip() {
        let run_id = RunId::new();
        assert!(run_id.to_string().starts_with("RUN_"));
        assert_eq!(run_id.short().len(), 8);

        let json = serde_json::to_string(&run_id).unwrap();
        let parsed: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, run_id);
        assert_ne!(run_id, RunId::new());
    }
}
