use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimulationError` and maps other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// Invalid construction parameters. The run never starts.
    ConfigurationError(String),
    ReportError(String),
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CSVError(error)
    }
}

impl std::error::Error for SimulationError {}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::ConfigurationError(message) => {
                write!(f, "Configuration error: {message}")
            }
            SimulationError::ReportError(message) => write!(f, "Report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let error = SimulationError::ConfigurationError("bad fraction".to_string());
        assert_eq!(error.to_string(), "Configuration error: bad fraction");
    }

    #[test]
    fn io_error_converts() {
        fn open_missing() -> Result<(), SimulationError> {
            std::fs::File::open("/this/path/does/not/exist.json")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(SimulationError::IoError(_))));
    }
}
