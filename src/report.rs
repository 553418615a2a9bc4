use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::debug;

use crate::error::SimulationError;
use crate::event_log::TimeStepSummary;

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path) -> Result<File, SimulationError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(SimulationError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// A CSV report with one row per completed time step.
pub struct StepReport {
    writer: Writer<File>,
}

impl StepReport {
    /// # Errors
    ///
    /// Returns a `ReportError` if `path` does not end in `.csv`, or an `IoError` if the file
    /// cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let file = generate_validate_filepath(path)?;
        debug!("writing step report to {}", path.display());
        Ok(StepReport {
            writer: Writer::from_writer(file),
        })
    }

    /// Writes a new row for the given step and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn send(&mut self, summary: &TimeStepSummary) -> Result<(), SimulationError> {
        self.writer.serialize(summary)?;
        self.writer.flush()?;
        Ok(())
    }
}
