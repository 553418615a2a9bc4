use std::fs;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::random::DEFAULT_SEED;
use crate::virus::{check_probability, Virus};

/// Everything needed to set up a run. Loaded from the command line or from a JSON file such as
///
/// ```json
/// {
///     "virus_name": "HIV",
///     "transmission_probability": 0.8,
///     "mortality_probability": 0.3,
///     "population_size": 900,
///     "vaccination_fraction": 0.1,
///     "initial_infected": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub virus_name: String,
    pub transmission_probability: f64,
    pub mortality_probability: f64,
    // Signed so that a negative size is reported as a configuration error instead of a parse
    // failure.
    pub population_size: i64,
    pub vaccination_fraction: f64,
    #[serde(default = "default_initial_infected")]
    pub initial_infected: i64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Stop after this many time steps even if the epidemic is still running.
    #[serde(default)]
    pub max_time_steps: Option<u64>,
}

fn default_initial_infected() -> i64 {
    1
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Parameters {
    /// Parameters with the default initial infected count, seed and no step limit.
    #[must_use]
    pub fn new(
        virus_name: impl Into<String>,
        transmission_probability: f64,
        mortality_probability: f64,
        population_size: i64,
        vaccination_fraction: f64,
    ) -> Self {
        Parameters {
            virus_name: virus_name.into(),
            transmission_probability,
            mortality_probability,
            population_size,
            vaccination_fraction,
            initial_infected: default_initial_infected(),
            seed: default_seed(),
            max_time_steps: None,
        }
    }

    /// Reads parameters from a JSON file and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for `Parameters`, or
    /// fails [`Parameters::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, SimulationError> {
        trace!("loading parameters from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns a `ConfigurationError` describing the first invalid value found.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.virus_name.trim().is_empty() {
            return Err(SimulationError::ConfigurationError(
                "virus name must not be empty".to_string(),
            ));
        }
        if self.population_size < 0 {
            return Err(SimulationError::ConfigurationError(format!(
                "population size must not be negative, got {}",
                self.population_size
            )));
        }
        if self.initial_infected < 0 {
            return Err(SimulationError::ConfigurationError(format!(
                "initial infected count must not be negative, got {}",
                self.initial_infected
            )));
        }
        check_probability("transmission probability", self.transmission_probability)?;
        check_probability("mortality probability", self.mortality_probability)?;
        check_probability("vaccination fraction", self.vaccination_fraction)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the virus description is invalid.
    pub fn virus(&self) -> Result<Virus, SimulationError> {
        Virus::new(
            self.virus_name.clone(),
            self.transmission_probability,
            self.mortality_probability,
        )
    }

    /// The conventional event log file name for these parameters, e.g.
    /// `HIV_simulation_pop_900_vp_0.1_infected_50.txt`.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        format!(
            "{}_simulation_pop_{}_vp_{:?}_infected_{}.txt",
            self.virus_name, self.population_size, self.vaccination_fraction, self.initial_infected
        )
    }

    /// The step report that accompanies [`Parameters::log_file_name`].
    #[must_use]
    pub fn report_file_name(&self) -> String {
        format!(
            "{}_simulation_pop_{}_vp_{:?}_infected_{}_steps.csv",
            self.virus_name, self.population_size, self.vaccination_fraction, self.initial_infected
        )
    }
}
