//! Result export
//!
//! Writes a finished run to disk: the per-prescription table and the pickup
//! audit as CSV, and the summary as pretty-printed JSON. File names carry the
//! short run id so repeated runs can share an output directory.

use crate::simulation::metrics::{PickupAuditRow, PrescriptionRow};
use crate::simulation::orchestrator::SimulationOutcome;
use crate::simulation::statistics::RunSummary;
use crate::simulation::SimulationResult;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Per-prescription CSV
    pub prescriptions: PathBuf,
    /// Pickup audit CSV
    pub pickups: PathBuf,
    /// Summary JSON
    pub summary: PathBuf,
}

impl ExportPaths {
    /// File names for a run inside `directory`
    pub fn for_run(directory: &Path, run_short_id: &str) -> Self {
        Self {
            prescriptions: directory.join(format!("prescriptions_{}.csv", run_short_id)),
            pickups: directory.join(format!("pickups_{}.csv", run_short_id)),
            summary: directory.join(format!("summary_{}.json", run_short_id)),
        }
    }
}

fn write_rows<W: Write, R: Serialize>(rows: &[R], writer: W) -> SimulationResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the per-prescription table as CSV
pub fn write_prescriptions<W: Write>(rows: &[PrescriptionRow], writer: W) -> SimulationResult<()> {
    write_rows(rows, writer)
}

/// Write the pickup audit as CSV
pub fn write_pickups<W: Write>(rows: &[PickupAuditRow], writer: W) -> SimulationResult<()> {
    write_rows(rows, writer)
}

/// Write the summary as pretty JSON
pub fn write_summary<W: Write>(summary: &RunSummary, mut writer: W) -> SimulationResult<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write all three result files of a run into `directory`, creating it if needed
pub fn export_outcome(outcome: &SimulationOutcome, directory: impl AsRef<Path>) -> SimulationResult<ExportPaths> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;
    let paths = ExportPaths::for_run(directory, &outcome.run_id().short());

    write_prescriptions(&outcome.prescription_rows(), File::create(&paths.prescriptions)?)?;
    write_pickups(&outcome.pickup_audit, File::create(&paths.pickups)?)?;
    write_summary(&outcome.summary, File::create(&paths.summary)?)?;

    info!(
        "Exported run {} to {}",
        outcome.run_id(),
        directory.display()
    );
    Ok(paths)
}
