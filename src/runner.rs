use std::fs::create_dir_all;
use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::error::SimulationError;
use crate::event_log::TextLogger;
use crate::log::apply_log_specification;
use crate::parameters::Parameters;
use crate::report::StepReport;
use crate::simulation::{Simulation, SimulationOutcome};

/// Command line arguments for the `herd-immunity` binary
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Name of the virus
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub virus_name: Option<String>,

    /// Probability that an interaction with a susceptible person infects them
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    pub transmission_probability: Option<f64>,

    /// Probability that an infected person dies of the infection
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    pub mortality_probability: Option<f64>,

    /// Number of people in the population
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    pub population_size: Option<i64>,

    /// Fraction of the population that is vaccinated, between 0 and 1
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    pub vaccination_fraction: Option<f64>,

    /// Number of people infected at the start [default: 1]
    #[arg(allow_negative_numbers = true)]
    pub initial_infected: Option<i64>,

    /// Random seed [default: 42, or the seed in the config file]
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Path to a JSON parameters file, used instead of the positional arguments
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the event log and report
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Diagnostic log level, either a level or a list of `module=level` pairs
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Stop after this many time steps
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Also write a CSV report with one row per time step
    #[arg(long)]
    pub report: bool,
}

impl BaseArgs {
    /// Assembles and validates the run parameters, either from the config file or from the
    /// positional arguments. `--random-seed` and `--max-steps` override the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, a required value is missing, or a
    /// value is invalid.
    pub fn parameters(&self) -> Result<Parameters, SimulationError> {
        let mut parameters = match &self.config {
            Some(path) => {
                info!("Loading parameters from: {}", path.display());
                Parameters::from_json_file(path)?
            }
            None => {
                let (
                    Some(virus_name),
                    Some(transmission_probability),
                    Some(mortality_probability),
                    Some(population_size),
                    Some(vaccination_fraction),
                ) = (
                    self.virus_name.clone(),
                    self.transmission_probability,
                    self.mortality_probability,
                    self.population_size,
                    self.vaccination_fraction,
                )
                else {
                    return Err(SimulationError::ConfigurationError(
                        "virus name, transmission probability, mortality probability, \
                         population size and vaccination fraction are required"
                            .to_string(),
                    ));
                };
                let mut parameters = Parameters::new(
                    virus_name,
                    transmission_probability,
                    mortality_probability,
                    population_size,
                    vaccination_fraction,
                );
                if let Some(initial_infected) = self.initial_infected {
                    parameters.initial_infected = initial_infected;
                }
                parameters
            }
        };

        if let Some(seed) = self.random_seed {
            parameters.seed = seed;
        }
        if let Some(max_steps) = self.max_steps {
            parameters.max_time_steps = Some(max_steps);
        }
        parameters.validate()?;
        Ok(parameters)
    }
}

fn create_cli() -> Command {
    let cli = Command::new("herd-immunity")
        .about("Simulates the spread of a virus through a partially vaccinated population");
    BaseArgs::augment_args(cli)
}

/// Parses the command line arguments and runs a simulation with them.
///
/// # Errors
///
/// Returns an error if argument parsing, configuration or the run itself fails
pub fn run_with_args() -> Result<SimulationOutcome, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(&args)?)
}

/// Runs a simulation as described by `args`, writing the event log (and optionally the step
/// report) to the output directory.
///
/// # Errors
///
/// Returns an error if configuration or the run itself fails
pub fn run_with_args_internal(args: &BaseArgs) -> Result<SimulationOutcome, SimulationError> {
    if let Some(specification) = &args.log_level {
        apply_log_specification(specification)?;
    }
    let parameters = args.parameters()?;

    create_dir_all(&args.output_dir)?;
    let log_path = args.output_dir.join(parameters.log_file_name());
    let logger = TextLogger::create(&log_path)?;
    let mut simulation = Simulation::from_parameters(&parameters, logger)?;
    if args.report {
        let report = StepReport::create(args.output_dir.join(parameters.report_file_name()))?;
        simulation = simulation.with_report(report);
    }

    let outcome = simulation.run()?;
    info!("Event log written to: {}", log_path.display());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::StopReason;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn args(output_dir: PathBuf) -> BaseArgs {
        BaseArgs {
            virus_name: Some("Ebola".to_string()),
            transmission_probability: Some(0.7),
            mortality_probability: Some(0.5),
            population_size: Some(200),
            vaccination_fraction: Some(0.2),
            output_dir,
            ..BaseArgs::default()
        }
    }

    #[test]
    fn test_cli_definition() {
        create_cli().debug_assert();
    }

    #[test]
    fn test_run_with_positional_args() {
        let temp_dir = tempdir().unwrap();
        let outcome = run_with_args_internal(&args(temp_dir.path().to_path_buf())).unwrap();
        assert!(outcome.time_steps > 0);

        let log_path = temp_dir
            .path()
            .join("Ebola_simulation_pop_200_vp_0.2_infected_1.txt");
        let contents = std::fs::read_to_string(log_path).unwrap();
        assert_eq!(contents.lines().next(), Some("200\t0.2\tEbola\t0.5\t0.7"));
    }

    #[test]
    fn test_run_with_random_seed() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let mut first_args = args(first.path().to_path_buf());
        first_args.random_seed = Some(9);
        let mut second_args = args(second.path().to_path_buf());
        second_args.random_seed = Some(9);

        assert_eq!(
            run_with_args_internal(&first_args).unwrap(),
            run_with_args_internal(&second_args).unwrap()
        );
        let name = "Ebola_simulation_pop_200_vp_0.2_infected_1.txt";
        assert_eq!(
            std::fs::read(first.path().join(name)).unwrap(),
            std::fs::read(second.path().join(name)).unwrap()
        );
    }

    #[test]
    fn test_run_with_config_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"virus_name": "Measles", "transmission_probability": 0.9,
                "mortality_probability": 0.0, "population_size": 50,
                "vaccination_fraction": 1.0, "initial_infected": 0, "seed": 3}}"#
        )
        .unwrap();
        let temp_dir = tempdir().unwrap();
        let config_args = BaseArgs {
            config: Some(file.path().to_path_buf()),
            output_dir: temp_dir.path().to_path_buf(),
            ..BaseArgs::default()
        };
        assert_eq!(config_args.parameters().unwrap().seed, 3);

        let outcome = run_with_args_internal(&config_args).unwrap();
        assert_eq!(outcome.time_steps, 0);
        assert_eq!(outcome.stop_reason, StopReason::NoSusceptibleRemaining);
    }

    #[test]
    fn test_seed_and_step_limit_override_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"virus_name": "Measles", "transmission_probability": 0.9,
                "mortality_probability": 0.1, "population_size": 50,
                "vaccination_fraction": 0.5, "seed": 3, "max_time_steps": 10}}"#
        )
        .unwrap();
        let config_args = BaseArgs {
            config: Some(file.path().to_path_buf()),
            random_seed: Some(7),
            max_steps: Some(2),
            ..BaseArgs::default()
        };
        let parameters = config_args.parameters().unwrap();
        assert_eq!(parameters.seed, 7);
        assert_eq!(parameters.max_time_steps, Some(2));
        assert_eq!(parameters.population_size, 50);
    }

    #[test]
    fn test_run_with_report() {
        let temp_dir = tempdir().unwrap();
        let mut report_args = args(temp_dir.path().join("out"));
        report_args.report = true;
        report_args.max_steps = Some(2);
        let outcome = run_with_args_internal(&report_args).unwrap();

        let report_path = temp_dir
            .path()
            .join("out")
            .join("Ebola_simulation_pop_200_vp_0.2_infected_1_steps.csv");
        let mut reader = csv::Reader::from_path(report_path).unwrap();
        let rows = reader.records().count();
        assert_eq!(rows as u64, outcome.time_steps);
    }

    #[test]
    fn test_missing_positional_args() {
        let missing = BaseArgs {
            virus_name: Some("Flu".to_string()),
            ..BaseArgs::default()
        };
        assert!(matches!(
            missing.parameters(),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_invalid_args_write_nothing() {
        let temp_dir = tempdir().unwrap();
        let mut bad_args = args(temp_dir.path().to_path_buf());
        bad_args.vaccination_fraction = Some(1.5);
        assert!(matches!(
            run_with_args_internal(&bad_args),
            Err(SimulationError::ConfigurationError(_))
        ));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
