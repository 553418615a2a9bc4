//! The population model: an arena of [`Person`] records indexed by [`PersonId`], plus the
//! bookkeeping of who is currently infected and who was infected during the step in progress.
//!
//! The live-infected set and the newly-infected accumulator only ever hold ids. The `Person`
//! records themselves live in exactly one place.
use std::ops::Index;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::error::SimulationError;
use crate::person::{InfectionStatus, Person, PersonId};
use crate::random::SimulationRng;
use crate::virus::{check_probability, Virus};

/// Below this share of living people, target sampling walks the living people directly instead
/// of drawing random indexes until one lands on a living person.
const REJECTION_SAMPLING_MIN_ALIVE_SHARE: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct Population {
    people: Vec<Person>,
    alive_count: usize,
    live_infected: IndexSet<PersonId>,
    newly_infected: Vec<PersonId>,
}

impl Population {
    /// Builds a population of `population_size` people by sequential assignment: the first
    /// `initial_infected` people start infected, the next `floor(vaccination_fraction *
    /// population_size)` are vaccinated, and everyone else is healthy and unvaccinated.
    ///
    /// Counts that do not fit are clamped. At most `population_size` people start infected and
    /// the vaccinated count is capped by whoever is left.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if `vaccination_fraction` is outside `[0, 1]`.
    pub fn new(
        population_size: usize,
        vaccination_fraction: f64,
        initial_infected: usize,
    ) -> Result<Self, SimulationError> {
        check_probability("vaccination fraction", vaccination_fraction)?;

        let infected_count = initial_infected.min(population_size);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let vaccinated_count = ((vaccination_fraction * population_size as f64).floor() as usize)
            .min(population_size - infected_count);
        debug!(
            "creating population of {population_size}: {infected_count} infected, \
             {vaccinated_count} vaccinated"
        );

        let people = (0..population_size)
            .map(|index| {
                let id = PersonId(index);
                if index < infected_count {
                    Person::new(id, false, InfectionStatus::Infected)
                } else if index < infected_count + vaccinated_count {
                    Person::new(id, true, InfectionStatus::Susceptible)
                } else {
                    Person::new(id, false, InfectionStatus::Susceptible)
                }
            })
            .collect();

        Ok(Population {
            people,
            alive_count: population_size,
            live_infected: (0..infected_count).map(PersonId).collect(),
            newly_infected: Vec::new(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    #[must_use]
    pub fn get(&self, person_id: PersonId) -> Option<&Person> {
        self.people.get(person_id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.people.len() - self.alive_count
    }

    #[must_use]
    pub fn vaccinated_count(&self) -> usize {
        self.people.iter().filter(|p| p.is_vaccinated()).count()
    }

    /// Ids of the people carrying an active infection, in the order they were infected.
    pub fn live_infected(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.live_infected.iter().copied()
    }

    #[must_use]
    pub fn live_infected_count(&self) -> usize {
        self.live_infected.len()
    }

    /// Ids infected during the step in progress, in the order the infections happened. Empty
    /// between steps.
    #[must_use]
    pub fn newly_infected(&self) -> &[PersonId] {
        &self.newly_infected
    }

    /// True while at least one living person is unvaccinated.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.people
            .iter()
            .any(|person| person.is_alive() && !person.is_vaccinated())
    }

    /// Picks a uniformly random living person other than `source`. Every call is an independent
    /// draw, so the same target may come up repeatedly. Returns `None` when `source` is the only
    /// person left alive.
    pub fn sample_interaction_target(
        &self,
        rng: &mut SimulationRng,
        source: PersonId,
    ) -> Option<PersonId> {
        let source_alive = self.people[source.0].is_alive();
        let candidates = self.alive_count - usize::from(source_alive);
        if candidates == 0 {
            return None;
        }

        let is_candidate = |person: &Person| person.is_alive() && person.id() != source;

        #[allow(clippy::cast_precision_loss)]
        let alive_share = candidates as f64 / self.people.len() as f64;
        if alive_share >= REJECTION_SAMPLING_MIN_ALIVE_SHARE {
            loop {
                let index = rng.sample_range(0..self.people.len());
                if is_candidate(&self.people[index]) {
                    return Some(PersonId(index));
                }
            }
        }

        let nth = rng.sample_range(0..candidates);
        self.people
            .iter()
            .filter(|&person| is_candidate(person))
            .nth(nth)
            .map(Person::id)
    }

    /// Records that `person_id` caught the virus during the current step. The person is not
    /// marked infected until [`Population::infect_newly_infected`] runs.
    pub(crate) fn queue_infection(&mut self, person_id: PersonId) {
        self.newly_infected.push(person_id);
    }

    /// Resolves the infection of a living, infected person and removes them from the
    /// live-infected set. Returns true if they survived.
    ///
    /// # Panics
    ///
    /// Panics with an `InvalidStateError` if the person is dead or not infected.
    pub(crate) fn resolve_infection(
        &mut self,
        person_id: PersonId,
        virus: &Virus,
        rng: &mut SimulationRng,
    ) -> bool {
        let survived = self.people[person_id.0].did_survive_infection(virus, rng);
        if !survived {
            self.alive_count -= 1;
        }
        self.live_infected.shift_remove(&person_id);
        survived
    }

    /// Marks every person queued during this step as infected and adds them to the
    /// live-infected set, then clears the queue. A person queued more than once is counted
    /// once. Returns the number of people newly infected.
    pub(crate) fn infect_newly_infected(&mut self) -> usize {
        let mut infected = 0;
        for person_id in std::mem::take(&mut self.newly_infected) {
            let person = &mut self.people[person_id.0];
            if person.infect() {
                self.live_infected.insert(person_id);
                infected += 1;
            } else {
                trace!("{person_id} was queued for infection more than once this step");
            }
        }
        infected
    }
}

impl Index<PersonId> for Population {
    type Output = Person;

    fn index(&self, person_id: PersonId) -> &Person {
        &self.people[person_id.0]
    }
}
