//! The simulation engine.
//!
//! A [`Simulation`] owns the population, the virus, the random source and the event logger, and
//! advances the epidemic one discrete time step at a time:
//!
//! 1. Every person in the live-infected set has [`INTERACTIONS_PER_INFECTED`] interactions with
//!    random living people. Susceptible targets catch the virus with the virus's transmission
//!    probability and are queued as newly infected.
//! 2. Each of those infected people then either dies or recovers, according to the virus's
//!    mortality probability. Either way they leave the live-infected set.
//! 3. The people queued during the step become infected and form the live-infected set for the
//!    next step.
//!
//! The run ends as soon as nobody alive is unvaccinated, nobody is left carrying the infection,
//! or an optional step limit is hit.
use log::{debug, info, trace};
use serde::Serialize;

use crate::error::SimulationError;
use crate::event_log::{EventLogger, InteractionOutcome, TimeStepSummary};
use crate::parameters::Parameters;
use crate::person::PersonId;
use crate::population::Population;
use crate::random::SimulationRng;
use crate::report::StepReport;
use crate::virus::Virus;

/// How many interactions each infected person has per time step.
pub const INTERACTIONS_PER_INFECTED: usize = 100;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Everyone still alive is vaccinated (or nobody is alive).
    NoSusceptibleRemaining,
    /// Nobody is carrying the infection any more, so no further infections are possible.
    InfectionExtinct,
    StepLimitReached,
}

/// Final tallies of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationOutcome {
    pub time_steps: u64,
    pub total_infected: usize,
    pub total_dead: usize,
    pub survivors: usize,
    pub stop_reason: StopReason,
}

pub struct Simulation<L: EventLogger> {
    population: Population,
    virus: Virus,
    vaccination_fraction: f64,
    rng: SimulationRng,
    logger: L,
    report: Option<StepReport>,
    max_time_steps: Option<u64>,
    metadata_written: bool,

    time_step: u64,
    total_infected: usize,
    total_dead: usize,
    current_infected: usize,
    dead_this_step: usize,
}

impl<L: EventLogger> Simulation<L> {
    /// Creates a simulation over a freshly built population (see [`Population::new`] for how
    /// roles are assigned).
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if `vaccination_fraction` is outside `[0, 1]`.
    pub fn new(
        population_size: usize,
        vaccination_fraction: f64,
        virus: Virus,
        initial_infected: usize,
        rng: SimulationRng,
        logger: L,
    ) -> Result<Self, SimulationError> {
        let population = Population::new(population_size, vaccination_fraction, initial_infected)?;
        let total_infected = population.live_infected_count();
        Ok(Simulation {
            population,
            virus,
            vaccination_fraction,
            rng,
            logger,
            report: None,
            max_time_steps: None,
            metadata_written: false,
            time_step: 0,
            total_infected,
            total_dead: 0,
            current_infected: total_infected,
            dead_this_step: 0,
        })
    }

    /// Creates a simulation from validated [`Parameters`], seeding the random source with
    /// `parameters.seed`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the parameters are invalid.
    pub fn from_parameters(parameters: &Parameters, logger: L) -> Result<Self, SimulationError> {
        parameters.validate()?;
        let population_size = to_count("population size", parameters.population_size)?;
        let initial_infected = to_count("initial infected count", parameters.initial_infected)?;
        let simulation = Simulation::new(
            population_size,
            parameters.vaccination_fraction,
            parameters.virus()?,
            initial_infected,
            SimulationRng::new(parameters.seed),
            logger,
        )?;
        Ok(match parameters.max_time_steps {
            Some(max_time_steps) => simulation.with_step_limit(max_time_steps),
            None => simulation,
        })
    }

    /// Stops [`Simulation::run`] after `max_time_steps` steps.
    #[must_use]
    pub fn with_step_limit(mut self, max_time_steps: u64) -> Self {
        self.max_time_steps = Some(max_time_steps);
        self
    }

    /// Also writes every step summary to `report`.
    #[must_use]
    pub fn with_report(mut self, report: StepReport) -> Self {
        self.report = Some(report);
        self
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn virus(&self) -> &Virus {
        &self.virus
    }

    /// The index of the next time step to run.
    #[must_use]
    pub fn current_time_step(&self) -> u64 {
        self.time_step
    }

    /// Everyone ever infected, including the initially infected and those who died.
    #[must_use]
    pub fn total_infected(&self) -> usize {
        self.total_infected
    }

    #[must_use]
    pub fn total_dead(&self) -> usize {
        self.total_dead
    }

    /// People infected during the most recent step.
    #[must_use]
    pub fn current_infected(&self) -> usize {
        self.current_infected
    }

    #[must_use]
    pub fn dead_this_step(&self) -> usize {
        self.dead_this_step
    }

    #[must_use]
    pub fn logger(&self) -> &L {
        &self.logger
    }

    pub fn into_logger(self) -> L {
        self.logger
    }

    /// True while at least one living person is unvaccinated.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.population.should_continue()
    }

    /// Runs time steps until the run is over. The metadata line is written before the first
    /// step.
    ///
    /// # Errors
    ///
    /// Returns an error if the event logger or the step report fails.
    pub fn run(&mut self) -> Result<SimulationOutcome, SimulationError> {
        info!(
            "starting simulation of {} in a population of {}",
            self.virus.name(),
            self.population.len()
        );
        self.write_metadata()?;

        let stop_reason = loop {
            if !self.should_continue() {
                break StopReason::NoSusceptibleRemaining;
            }
            if self.population.live_infected_count() == 0 {
                break StopReason::InfectionExtinct;
            }
            if self.max_time_steps.is_some_and(|max| self.time_step >= max) {
                break StopReason::StepLimitReached;
            }
            self.step()?;
        };
        self.logger.finish()?;

        let outcome = SimulationOutcome {
            time_steps: self.time_step,
            total_infected: self.total_infected,
            total_dead: self.total_dead,
            survivors: self.population.alive_count(),
            stop_reason,
        };
        info!("simulation ended: {outcome:?}");
        Ok(outcome)
    }

    /// Writes the run's metadata line. Only the first call has any effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the event logger fails.
    pub fn write_metadata(&mut self) -> Result<(), SimulationError> {
        if self.metadata_written {
            return Ok(());
        }
        self.logger.write_metadata(
            self.population.len(),
            self.vaccination_fraction,
            self.virus.name(),
            self.virus.mortality_probability(),
            self.virus.transmission_probability(),
        )?;
        self.metadata_written = true;
        Ok(())
    }

    /// Runs a single time step and returns its summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the event logger or the step report fails.
    pub fn step(&mut self) -> Result<TimeStepSummary, SimulationError> {
        self.dead_this_step = 0;

        let infected: Vec<PersonId> = self.population.live_infected().collect();
        for person_id in infected {
            if !self.population[person_id].is_alive() {
                continue;
            }
            for _ in 0..INTERACTIONS_PER_INFECTED {
                let Some(target) = self
                    .population
                    .sample_interaction_target(&mut self.rng, person_id)
                else {
                    debug!("{person_id} has nobody left to interact with, skipping interactions");
                    break;
                };
                self.interaction(person_id, target)?;
            }
            self.resolve_infection(person_id)?;
        }

        self.current_infected = self.population.infect_newly_infected();
        self.total_infected += self.current_infected;

        let summary = TimeStepSummary {
            time_step: self.time_step,
            infected_this_step: self.current_infected,
            dead_this_step: self.dead_this_step,
            total_infected: self.total_infected,
            total_dead: self.total_dead,
            population_size: self.population.len(),
        };
        debug!("{summary:?}");
        self.logger.log_time_step(&summary)?;
        if let Some(report) = &mut self.report {
            report.send(&summary)?;
        }
        self.time_step += 1;
        Ok(summary)
    }

    /// Resolves one interaction between the infected `person` and `target`. A susceptible
    /// target who catches the virus is queued and becomes infected at the end of the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the event logger fails.
    ///
    /// # Panics
    ///
    /// Panics with an `InvalidStateError` if either participant is dead.
    pub fn interaction(
        &mut self,
        person: PersonId,
        target: PersonId,
    ) -> Result<InteractionOutcome, SimulationError> {
        assert!(
            self.population[person].is_alive(),
            "InvalidStateError: interaction source {person} is not alive"
        );
        let target_person = &self.population[target];
        assert!(
            target_person.is_alive(),
            "InvalidStateError: interaction target {target} is not alive"
        );

        let outcome = if target_person.is_vaccinated() {
            InteractionOutcome::BlockedVaccinated
        } else if target_person.has_been_infected() {
            InteractionOutcome::BlockedAlreadySick
        } else if self.rng.sample_bool(self.virus.transmission_probability()) {
            self.population.queue_infection(target);
            InteractionOutcome::Infected
        } else {
            InteractionOutcome::NoTransmission
        };
        trace!("{person} -> {target}: {outcome:?}");
        self.logger.log_interaction(person, target, outcome)?;
        Ok(outcome)
    }

    fn resolve_infection(&mut self, person_id: PersonId) -> Result<(), SimulationError> {
        let survived = self
            .population
            .resolve_infection(person_id, &self.virus, &mut self.rng);
        if !survived {
            self.total_dead += 1;
            self.dead_this_step += 1;
        }
        trace!(
            "{person_id} {}",
            if survived { "survived" } else { "died" }
        );
        self.logger.log_infection_survival(person_id, !survived)
    }
}

fn to_count(label: &str, value: i64) -> Result<usize, SimulationError> {
    usize::try_from(value).map_err(|_| {
        SimulationError::ConfigurationError(format!("{label} must not be negative, got {value}"))
    })
}
