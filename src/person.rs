use std::fmt::{self, Display};

use serde::Serialize;

use crate::random::SimulationRng;
use crate::virus::Virus;

/// Identifies a person within a population. Ids are assigned sequentially from zero when the
/// population is created and double as the index of the person in the population.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        PersonId(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a person stands with respect to the simulated virus. Transitions only move forward:
/// `Susceptible -> Infected -> Recovered`. Nobody becomes susceptible again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InfectionStatus {
    /// Never infected.
    Susceptible,
    /// Carrying an active infection.
    Infected,
    /// Survived an infection and is immune for the rest of the run.
    Recovered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    id: PersonId,
    alive: bool,
    vaccinated: bool,
    infection_status: InfectionStatus,
}

impl Person {
    /// # Panics
    ///
    /// Panics if a vaccinated person is created with an infection.
    pub(crate) fn new(id: PersonId, vaccinated: bool, infection_status: InfectionStatus) -> Self {
        assert!(
            !(vaccinated && infection_status != InfectionStatus::Susceptible),
            "InvalidStateError: vaccinated person {id} cannot carry an infection"
        );
        Person {
            id,
            alive: true,
            vaccinated,
            infection_status,
        }
    }

    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    #[must_use]
    pub fn infection_status(&self) -> InfectionStatus {
        self.infection_status
    }

    /// True for a person who currently carries, or once carried, the virus.
    #[must_use]
    pub fn has_been_infected(&self) -> bool {
        self.infection_status != InfectionStatus::Susceptible
    }

    /// Marks a susceptible person as infected. Returns false, and changes nothing, if the person
    /// was already infected or has recovered.
    ///
    /// # Panics
    ///
    /// Panics with an `InvalidStateError` if the person is vaccinated or dead.
    pub(crate) fn infect(&mut self) -> bool {
        assert!(
            !self.vaccinated,
            "InvalidStateError: vaccinated person {} cannot be infected",
            self.id
        );
        assert!(
            self.alive,
            "InvalidStateError: dead person {} cannot be infected",
            self.id
        );
        if self.infection_status == InfectionStatus::Susceptible {
            self.infection_status = InfectionStatus::Infected;
            true
        } else {
            false
        }
    }

    /// Decides whether this person survives their infection. A `[0, 1)` draw below the virus's
    /// mortality probability kills the person; otherwise they recover and are immune from now
    /// on. Returns true if the person survived.
    ///
    /// # Panics
    ///
    /// Panics with an `InvalidStateError` if the person is dead or not currently infected.
    pub(crate) fn did_survive_infection(&mut self, virus: &Virus, rng: &mut SimulationRng) -> bool {
        assert!(
            self.alive,
            "InvalidStateError: survival resolved for dead person {}",
            self.id
        );
        assert_eq!(
            self.infection_status,
            InfectionStatus::Infected,
            "InvalidStateError: survival resolved for person {} who is not infected",
            self.id
        );

        if rng.sample_bool(virus.mortality_probability()) {
            self.alive = false;
            false
        } else {
            self.infection_status = InfectionStatus::Recovered;
            true
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn virus(mortality: f64) -> Virus {
        Virus::new("Test", 0.5, mortality).unwrap()
    }

    #[test]
    fn new_person_is_alive() {
        let person = Person::new(PersonId(3), false, InfectionStatus::Susceptible);
        assert_eq!(person.id(), PersonId(3));
        assert!(person.is_alive());
        assert!(!person.is_vaccinated());
        assert!(!person.has_been_infected());
    }

    #[test]
    fn infect_is_idempotent() {
        let mut person = Person::new(PersonId(0), false, InfectionStatus::Susceptible);
        assert!(person.infect());
        assert!(!person.infect());
        assert_eq!(person.infection_status(), InfectionStatus::Infected);
    }

    #[test]
    #[should_panic(expected = "InvalidStateError: vaccinated person 1 cannot be infected")]
    fn vaccinated_person_cannot_be_infected() {
        let mut person = Person::new(PersonId(1), true, InfectionStatus::Susceptible);
        person.infect();
    }

    #[test]
    #[should_panic(expected = "InvalidStateError: vaccinated person 2 cannot carry an infection")]
    fn vaccinated_person_cannot_start_infected() {
        let _ = Person::new(PersonId(2), true, InfectionStatus::Infected);
    }

    #[test]
    fn certain_death() {
        let mut rng = SimulationRng::new(42);
        let mut person = Person::new(PersonId(0), false, InfectionStatus::Infected);
        assert!(!person.did_survive_infection(&virus(1.0), &mut rng));
        assert!(!person.is_alive());
    }

    #[test]
    fn certain_survival_grants_immunity() {
        let mut rng = SimulationRng::new(42);
        let mut person = Person::new(PersonId(0), false, InfectionStatus::Infected);
        assert!(person.did_survive_infection(&virus(0.0), &mut rng));
        assert!(person.is_alive());
        assert_eq!(person.infection_status(), InfectionStatus::Recovered);
        assert!(!person.infect());
    }

    #[test]
    #[should_panic(expected = "InvalidStateError: survival resolved for dead person 0")]
    fn dead_person_cannot_resolve_again() {
        let mut rng = SimulationRng::new(42);
        let mut person = Person::new(PersonId(0), false, InfectionStatus::Infected);
        person.did_survive_infection(&virus(1.0), &mut rng);
        person.did_survive_infection(&virus(1.0), &mut rng);
    }

    #[test]
    #[should_panic(expected = "who is not infected")]
    fn healthy_person_cannot_resolve() {
        let mut rng = SimulationRng::new(42);
        let mut person = Person::new(PersonId(5), false, InfectionStatus::Susceptible);
        person.did_survive_infection(&virus(0.5), &mut rng);
    }
}
