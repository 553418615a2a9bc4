//! The event log records everything that happens during a run, in the order it happens, with
//! enough detail to reconstruct the run afterwards.
//!
//! The engine talks to the log through the [`EventLogger`] trait. [`TextLogger`] is the standard
//! implementation: the first line holds the tab-separated run metadata and every following line
//! is one sentence describing one event.
use std::fmt::{self, Display};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::error::SimulationError;
use crate::person::PersonId;

/// The result of one interaction between an infected person and a random target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InteractionOutcome {
    /// The target is, or has been, infected already.
    BlockedAlreadySick,
    BlockedVaccinated,
    Infected,
    NoTransmission,
}

/// Summary counts for one completed time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeStepSummary {
    pub time_step: u64,
    /// People who became infected during this step.
    pub infected_this_step: usize,
    pub dead_this_step: usize,
    pub total_infected: usize,
    pub total_dead: usize,
    pub population_size: usize,
}

/// Receives every event the simulation engine emits.
pub trait EventLogger {
    /// Called once, before the first time step.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    fn write_metadata(
        &mut self,
        population_size: usize,
        vaccination_fraction: f64,
        virus_name: &str,
        mortality_probability: f64,
        transmission_probability: f64,
    ) -> Result<(), SimulationError>;

    /// Called once per interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    fn log_interaction(
        &mut self,
        infector: PersonId,
        target: PersonId,
        outcome: InteractionOutcome,
    ) -> Result<(), SimulationError>;

    /// Called once per survival resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    fn log_infection_survival(
        &mut self,
        person: PersonId,
        died: bool,
    ) -> Result<(), SimulationError>;

    /// Called once per completed time step.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    fn log_time_step(&mut self, summary: &TimeStepSummary) -> Result<(), SimulationError>;

    /// Called once when the run ends.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output cannot be written.
    fn finish(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// An event logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl EventLogger for NullLogger {
    fn write_metadata(
        &mut self,
        _population_size: usize,
        _vaccination_fraction: f64,
        _virus_name: &str,
        _mortality_probability: f64,
        _transmission_probability: f64,
    ) -> Result<(), SimulationError> {
        Ok(())
    }

    fn log_interaction(
        &mut self,
        _infector: PersonId,
        _target: PersonId,
        _outcome: InteractionOutcome,
    ) -> Result<(), SimulationError> {
        Ok(())
    }

    fn log_infection_survival(
        &mut self,
        _person: PersonId,
        _died: bool,
    ) -> Result<(), SimulationError> {
        Ok(())
    }

    fn log_time_step(&mut self, _summary: &TimeStepSummary) -> Result<(), SimulationError> {
        Ok(())
    }
}

struct Interaction(PersonId, PersonId, InteractionOutcome);

impl Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Interaction(infector, target, outcome) = self;
        match outcome {
            InteractionOutcome::BlockedAlreadySick => {
                write!(f, "{infector} didn't infect {target} because already sick")
            }
            InteractionOutcome::BlockedVaccinated => {
                write!(f, "{infector} didn't infect {target} because vaccinated")
            }
            InteractionOutcome::Infected => write!(f, "{infector} infects {target}"),
            InteractionOutcome::NoTransmission => write!(f, "{infector} didn't infect {target}"),
        }
    }
}

/// Writes the event log as plain text lines to any [`Write`] sink.
pub struct TextLogger<W: Write> {
    writer: W,
}

impl<W: Write> TextLogger<W> {
    pub fn new(writer: W) -> Self {
        TextLogger { writer }
    }

    /// Returns the wrapped writer. Buffered writers are not flushed; call
    /// [`EventLogger::finish`] first.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextLogger<BufWriter<File>> {
    /// Creates (or truncates) the log file at `path`. A `.txt` extension is appended when the
    /// file name does not already end with one, and missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an `IoError` if the directory or file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = with_txt_extension(path.as_ref());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        debug!("writing event log to {}", path.display());
        Ok(TextLogger::new(BufWriter::new(File::create(path)?)))
    }
}

fn with_txt_extension(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".txt") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    }
}

impl<W: Write> EventLogger for TextLogger<W> {
    fn write_metadata(
        &mut self,
        population_size: usize,
        vaccination_fraction: f64,
        virus_name: &str,
        mortality_probability: f64,
        transmission_probability: f64,
    ) -> Result<(), SimulationError> {
        writeln!(
            self.writer,
            "{population_size}\t{vaccination_fraction:?}\t{virus_name}\t{mortality_probability:?}\t{transmission_probability:?}"
        )?;
        Ok(())
    }

    fn log_interaction(
        &mut self,
        infector: PersonId,
        target: PersonId,
        outcome: InteractionOutcome,
    ) -> Result<(), SimulationError> {
        writeln!(self.writer, "{}", Interaction(infector, target, outcome))?;
        Ok(())
    }

    fn log_infection_survival(
        &mut self,
        person: PersonId,
        died: bool,
    ) -> Result<(), SimulationError> {
        if died {
            writeln!(self.writer, "{person} died from infection")?;
        } else {
            writeln!(self.writer, "{person} survived infection.")?;
        }
        Ok(())
    }

    fn log_time_step(&mut self, summary: &TimeStepSummary) -> Result<(), SimulationError> {
        let TimeStepSummary {
            time_step,
            infected_this_step,
            dead_this_step,
            total_infected,
            total_dead,
            population_size,
        } = *summary;
        writeln!(
            self.writer,
            "Time step {time_step} ended, beginning {}",
            time_step + 1
        )?;
        writeln!(self.writer, "{infected_this_step} people were infected this step")?;
        writeln!(self.writer, "{dead_this_step} people died this step")?;
        writeln!(self.writer, "Total Infected: {total_infected} out of {population_size}")?;
        writeln!(self.writer, "Total Dead: {total_dead} out of {population_size}")?;
        // Keep the file readable while a long run is still going.
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimulationError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    fn lines(logger: TextLogger<Vec<u8>>) -> Vec<String> {
        String::from_utf8(logger.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn metadata_is_tab_separated() {
        let mut logger = TextLogger::new(Vec::new());
        logger.write_metadata(900, 0.1, "HIV", 0.3, 0.8).unwrap();
        assert_eq!(lines(logger), vec!["900\t0.1\tHIV\t0.3\t0.8"]);
    }

    #[test]
    fn metadata_keeps_decimal_point_on_whole_numbers() {
        let mut logger = TextLogger::new(Vec::new());
        logger.write_metadata(10, 1.0, "Ebola", 1.0, 0.0).unwrap();
        assert_eq!(lines(logger), vec!["10\t1.0\tEbola\t1.0\t0.0"]);
    }

    #[test]
    fn interaction_sentences() {
        let mut logger = TextLogger::new(Vec::new());
        let (a, b) = (PersonId(1), PersonId(2));
        logger
            .log_interaction(a, b, InteractionOutcome::BlockedAlreadySick)
            .unwrap();
        logger
            .log_interaction(a, b, InteractionOutcome::BlockedVaccinated)
            .unwrap();
        logger
            .log_interaction(a, b, InteractionOutcome::Infected)
            .unwrap();
        logger
            .log_interaction(a, b, InteractionOutcome::NoTransmission)
            .unwrap();
        assert_eq!(
            lines(logger),
            vec![
                "1 didn't infect 2 because already sick",
                "1 didn't infect 2 because vaccinated",
                "1 infects 2",
                "1 didn't infect 2",
            ]
        );
    }

    #[test]
    fn survival_sentences() {
        let mut logger = TextLogger::new(Vec::new());
        logger.log_infection_survival(PersonId(4), true).unwrap();
        logger.log_infection_survival(PersonId(5), false).unwrap();
        assert_eq!(
            lines(logger),
            vec!["4 died from infection", "5 survived infection."]
        );
    }

    #[test]
    fn time_step_summary() {
        let mut logger = TextLogger::new(Vec::new());
        logger
            .log_time_step(&TimeStepSummary {
                time_step: 0,
                infected_this_step: 3,
                dead_this_step: 1,
                total_infected: 4,
                total_dead: 1,
                population_size: 10,
            })
            .unwrap();
        assert_eq!(
            lines(logger),
            vec![
                "Time step 0 ended, beginning 1",
                "3 people were infected this step",
                "1 people died this step",
                "Total Infected: 4 out of 10",
                "Total Dead: 1 out of 10",
            ]
        );
    }

    #[test]
    fn create_appends_txt_extension() {
        let temp_dir = tempdir().unwrap();
        let mut logger = TextLogger::create(temp_dir.path().join("nested").join("run")).unwrap();
        logger.write_metadata(1, 0.0, "Flu", 0.1, 0.2).unwrap();
        logger.finish().unwrap();

        let file_path = temp_dir.path().join("nested").join("run.txt");
        assert!(file_path.exists(), "log file should exist");
        assert_eq!(
            std::fs::read_to_string(file_path).unwrap(),
            "1\t0.0\tFlu\t0.1\t0.2\n"
        );
    }

    #[test]
    fn create_keeps_existing_txt_extension() {
        assert_eq!(
            with_txt_extension(Path::new("out/log.txt")),
            PathBuf::from("out/log.txt")
        );
        assert_eq!(
            with_txt_extension(Path::new("out/log")),
            PathBuf::from("out/log.txt")
        );
    }
}
