//! The transmission phase of a tick, for one building.
//!
//! Every susceptible occupant independently becomes infected with the probability given by
//! [`infection_probability`] for the building's type and current infected share. Every infected
//! occupant progresses one hour towards recovery; in a hospital, the first patients up to the
//! treatment capacity of the workers present progress faster.
use rand::Rng;

use crate::buildings::{Building, BuildingType};
use crate::disease::{infection_probability, new_infection, progress_infection, treatment_capacity};
use crate::parameters::CityParameters;
use crate::people::{DiseaseState, PersonId, Population};

/// Plans the disease state changes for the occupants of `building`. Nothing is changed; the
/// caller applies the returned states once every building has been planned.
pub(crate) fn plan_transmission<R: Rng + ?Sized>(
    building: &Building,
    population: &Population,
    parameters: &CityParameters,
    rng: &mut R,
) -> Vec<(PersonId, DiseaseState)> {
    let occupants = building.occupants();
    if occupants.is_empty() {
        return Vec::new();
    }

    let infected = building.counts(population).infected;
    let p = infection_probability(
        infected,
        occupants.len(),
        parameters.transmissibility.get(building.building_type()),
    );

    let mut treatment_slots = if building.building_type() == BuildingType::Hospital {
        let workers_present = occupants
            .iter()
            .filter(|&&person_id| building.is_employee(person_id))
            .count();
        treatment_capacity(workers_present, parameters.patients_per_worker)
    } else {
        0
    };

    let mut changes = Vec::new();
    for &person_id in occupants {
        let state = population.state(person_id);
        match state {
            DiseaseState::Susceptible => {
                if p > 0.0 && rng.random_bool(p) {
                    changes.push((person_id, new_infection(parameters.infection_duration_hours)));
                }
            }
            DiseaseState::Infected { .. } => {
                let treated = treatment_slots > 0 && !building.is_employee(person_id);
                if treated {
                    treatment_slots -= 1;
                }
                changes.push((
                    person_id,
                    progress_infection(state, treated, parameters.treatment_speedup),
                ));
            }
            DiseaseState::Recovered => {}
        }
    }
    changes
}
