//! People are the agents of the city. Each person has a disease state, a home they always
//! return to, an optional employer (an office, school, restaurant, store or hospital they work at
//! or attend), and a current location.
//!
//! A person's location is only ever changed by moving them between buildings (see
//! `crate::city`), and their disease state only by the transmission phase of a tick or by
//! seeding. The `Population` keeps a running tally of S/I/R so city-wide counts never require a
//! scan.
use std::fmt::{self, Display};

use serde::Serialize;
use strum::Display as StrumDisplay;

use crate::buildings::BuildingId;

/// A unique identifier for a person. Ids are dense indices assigned in creation order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct PersonId(pub(crate) usize);

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, StrumDisplay)]
pub enum DiseaseState {
    Susceptible,
    /// Infected with the given number of hours remaining until recovery.
    Infected {
        hours_remaining: u32,
    },
    Recovered,
}

impl DiseaseState {
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        matches!(self, DiseaseState::Susceptible)
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        matches!(self, DiseaseState::Infected { .. })
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, DiseaseState::Recovered)
    }
}

/// Susceptible/Infected/Recovered counts.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub struct SirCounts {
    #[serde(rename = "S")]
    pub susceptible: usize,
    #[serde(rename = "I")]
    pub infected: usize,
    #[serde(rename = "R")]
    pub recovered: usize,
}

impl SirCounts {
    /// Adds one person in `state` to the tally.
    pub fn add(&mut self, state: DiseaseState) {
        match state {
            DiseaseState::Susceptible => self.susceptible += 1,
            DiseaseState::Infected { .. } => self.infected += 1,
            DiseaseState::Recovered => self.recovered += 1,
        }
    }

    /// Removes one person in `state` from the tally.
    pub fn remove(&mut self, state: DiseaseState) {
        match state {
            DiseaseState::Susceptible => self.susceptible -= 1,
            DiseaseState::Infected { .. } => self.infected -= 1,
            DiseaseState::Recovered => self.recovered -= 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

impl std::ops::Add for SirCounts {
    type Output = SirCounts;

    fn add(self, other: SirCounts) -> SirCounts {
        SirCounts {
            susceptible: self.susceptible + other.susceptible,
            infected: self.infected + other.infected,
            recovered: self.recovered + other.recovered,
        }
    }
}

impl std::iter::Sum for SirCounts {
    fn sum<I: Iterator<Item = SirCounts>>(iter: I) -> SirCounts {
        iter.fold(SirCounts::default(), |acc, counts| acc + counts)
    }
}

impl<'a> FromIterator<&'a DiseaseState> for SirCounts {
    fn from_iter<I: IntoIterator<Item = &'a DiseaseState>>(iter: I) -> Self {
        let mut counts = SirCounts::default();
        for state in iter {
            counts.add(*state);
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub(crate) id: PersonId,
    pub(crate) state: DiseaseState,
    pub(crate) home: BuildingId,
    pub(crate) employer: Option<BuildingId>,
    pub(crate) location: BuildingId,
}

impl Person {
    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> DiseaseState {
        self.state
    }

    #[must_use]
    pub fn home(&self) -> BuildingId {
        self.home
    }

    #[must_use]
    pub fn employer(&self) -> Option<BuildingId> {
        self.employer
    }

    /// The building this person currently occupies.
    #[must_use]
    pub fn location(&self) -> BuildingId {
        self.location
    }

    #[must_use]
    pub fn is_at_home(&self) -> bool {
        self.location == self.home
    }
}

/// Every person in the city, indexed by `PersonId`.
#[derive(Default, Debug)]
pub(crate) struct Population {
    people: Vec<Person>,
    counts: SirCounts,
}

impl Population {
    /// Creates a susceptible, unemployed person who lives and currently is at `home`.
    pub(crate) fn add_person(&mut self, home: BuildingId) -> PersonId {
        let id = PersonId(self.people.len());
        self.people.push(Person {
            id,
            state: DiseaseState::Susceptible,
            home,
            employer: None,
            location: home,
        });
        self.counts.add(DiseaseState::Susceptible);
        id
    }

    pub(crate) fn get(&self, person_id: PersonId) -> Option<&Person> {
        self.people.get(person_id.0)
    }

    pub(crate) fn get_mut(&mut self, person_id: PersonId) -> Option<&mut Person> {
        self.people.get_mut(person_id.0)
    }

    /// Replaces a person's disease state, keeping the tally in step.
    ///
    /// # Panics
    ///
    /// Panics if the person does not exist; callers only pass ids taken from occupant lists.
    pub(crate) fn set_state(&mut self, person_id: PersonId, state: DiseaseState) {
        let person = &mut self.people[person_id.0];
        self.counts.remove(person.state);
        self.counts.add(state);
        person.state = state;
    }

    pub(crate) fn state(&self, person_id: PersonId) -> DiseaseState {
        self.people[person_id.0].state
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.people.len()
    }

    pub(crate) fn counts(&self) -> SirCounts {
        self.counts
    }
}
