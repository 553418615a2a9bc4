//! A discrete time-step simulation of a virus spreading through a closed, partially vaccinated
//! population.
//!
//! The central object is the [`Simulation`], which owns:
//! * the [`Population`], an arena of [`Person`] records plus the set of people currently
//!   carrying the infection,
//! * the [`Virus`] being simulated,
//! * a single seeded [`SimulationRng`] from which every random draw is taken, so a fixed seed
//!   reproduces a run exactly,
//! * an [`EventLogger`] that receives every interaction, survival resolution and step summary.
//!
//! Each time step every infected person meets [`INTERACTIONS_PER_INFECTED`] random living
//! people, possibly infecting the susceptible ones, and then either dies or recovers. The run
//! ends once everyone alive is vaccinated, the infection has died out, or an optional step limit
//! is hit.
//!
//! ```rust
//! use herd_immunity::prelude::*;
//!
//! let virus = Virus::new("Measles", 0.9, 0.01).unwrap();
//! let mut simulation =
//!     Simulation::new(500, 0.8, virus, 3, SimulationRng::new(42), NullLogger).unwrap();
//! let outcome = simulation.run().unwrap();
//! assert!(outcome.total_infected <= 500);
//! ```
pub mod error;
pub mod event_log;
pub mod log;
pub mod parameters;
pub mod person;
pub mod population;
pub mod prelude;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod virus;

pub use error::SimulationError;
pub use event_log::{EventLogger, InteractionOutcome, NullLogger, TextLogger, TimeStepSummary};
pub use parameters::Parameters;
pub use person::{InfectionStatus, Person, PersonId};
pub use population::Population;
pub use random::SimulationRng;
pub use report::StepReport;
pub use simulation::{Simulation, SimulationOutcome, StopReason, INTERACTIONS_PER_INFECTED};
pub use virus::Virus;

// Re-export for downstream users
pub use crate::log::LevelFilter;
