//! Buildings are the settings in which people meet. Every building has a type, an occupant list,
//! and (for workplaces) a list of employees. Homes have no capacity limit; every other building
//! rejects admissions once it is full.
//!
//! Each building type has its own occupancy rule (see [`occupancy`]) that decides who enters and
//! who leaves at a given hour, and its own transmissibility (see [`crate::disease`]).
pub(crate) mod occupancy;
mod registry;
pub(crate) mod transmission;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

use crate::people::{Population, PersonId, SirCounts};

pub(crate) use registry::BuildingRegistry;

/// A unique identifier for a building, across all building types.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct BuildingId(pub(crate) usize);

impl Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BuildingType {
    Home,
    Office,
    School,
    Restaurant,
    Store,
    Hospital,
}

impl BuildingType {
    /// Whether buildings of this type have employees (or, for schools, enrolled students).
    #[must_use]
    pub fn is_workplace(self) -> bool {
        !matches!(self, BuildingType::Home)
    }
}

/// Bed and worker capacity of a hospital.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct HospitalCapacity {
    pub beds: usize,
    pub workers: usize,
}

#[derive(Clone, Debug)]
pub struct Building {
    id: BuildingId,
    building_type: BuildingType,
    capacity: Option<usize>,
    staff_positions: usize,
    hospital: Option<HospitalCapacity>,
    occupants: Vec<PersonId>,
    employees: Vec<PersonId>,
}

impl Building {
    pub(crate) fn new(
        id: BuildingId,
        building_type: BuildingType,
        capacity: Option<usize>,
        staff_positions: usize,
    ) -> Building {
        Building {
            id,
            building_type,
            capacity,
            staff_positions,
            hospital: None,
            occupants: Vec::new(),
            employees: Vec::new(),
        }
    }

    /// A hospital holds its beds' patients plus its workers.
    pub(crate) fn new_hospital(id: BuildingId, hospital: HospitalCapacity) -> Building {
        Building {
            hospital: Some(hospital),
            ..Building::new(
                id,
                BuildingType::Hospital,
                Some(hospital.beds + hospital.workers),
                hospital.workers,
            )
        }
    }

    #[must_use]
    pub fn id(&self) -> BuildingId {
        self.id
    }

    #[must_use]
    pub fn building_type(&self) -> BuildingType {
        self.building_type
    }

    /// The maximum number of occupants, or `None` if unlimited.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// The number of employees this building hires when workplaces are assigned.
    #[must_use]
    pub fn staff_positions(&self) -> usize {
        self.staff_positions
    }

    #[must_use]
    pub fn hospital_capacity(&self) -> Option<HospitalCapacity> {
        self.hospital
    }

    #[must_use]
    pub fn occupants(&self) -> &[PersonId] {
        &self.occupants
    }

    #[must_use]
    pub fn employees(&self) -> &[PersonId] {
        &self.employees
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.occupants.len()
    }

    #[must_use]
    pub fn has_room(&self) -> bool {
        self.capacity
            .is_none_or(|capacity| self.occupants.len() < capacity)
    }

    #[must_use]
    pub fn contains(&self, person_id: PersonId) -> bool {
        self.occupants.contains(&person_id)
    }

    #[must_use]
    pub fn is_employee(&self, person_id: PersonId) -> bool {
        self.employees.contains(&person_id)
    }

    /// Occupants who are not employees: residents of a home, visitors, or hospital patients.
    pub fn non_employees(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.occupants
            .iter()
            .copied()
            .filter(|person_id| !self.is_employee(*person_id))
    }

    /// Counts the disease states of the current occupants.
    pub(crate) fn counts(&self, population: &Population) -> SirCounts {
        let mut counts = SirCounts::default();
        for person_id in &self.occupants {
            counts.add(population.state(*person_id));
        }
        counts
    }

    /// Adds an occupant. Returns `false`, leaving the building unchanged, if the person is
    /// already inside or the building is full.
    pub(crate) fn add_occupant(&mut self, person_id: PersonId) -> bool {
        if !self.has_room() || self.contains(person_id) {
            return false;
        }
        self.occupants.push(person_id);
        true
    }

    /// Removes an occupant. Removing someone who is not inside is a no-op returning `false`.
    pub(crate) fn remove_occupant(&mut self, person_id: PersonId) -> bool {
        match self.occupants.iter().position(|&p| p == person_id) {
            Some(index) => {
                self.occupants.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_employee(&mut self, person_id: PersonId) {
        if !self.is_employee(person_id) {
            self.employees.push(person_id);
        }
    }

    pub(crate) fn remove_employee(&mut self, person_id: PersonId) {
        self.employees.retain(|&p| p != person_id);
    }
}
