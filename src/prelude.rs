pub use crate::error::SimulationError;
pub use crate::event_log::{
    EventLogger, InteractionOutcome, NullLogger, TextLogger, TimeStepSummary,
};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::Parameters;
pub use crate::person::{InfectionStatus, Person, PersonId};
pub use crate::population::Population;
pub use crate::random::SimulationRng;
pub use crate::report::StepReport;
pub use crate::simulation::{
    Simulation, SimulationOutcome, StopReason, INTERACTIONS_PER_INFECTED,
};
pub use crate::virus::Virus;
