//! The city orchestrator.
//!
//! All city state (the building registry, the population and the clock) lives in a single data
//! plugin on the [`Context`], and every operation on it is a method of [`ContextCityExt`]. A city
//! is therefore just a `Context` that has had buildings and people added to it:
//!
//! ```rust
//! use ixa_city::{BuildingType, Context, ContextCityExt, ContextRandomExt};
//!
//! let mut context = Context::new();
//! context.init_random(42);
//! context.add_homes(100);
//! context.construct_restaurants(2);
//! context.construct_offices(1);
//! context.assign_workplaces();
//! context.seed_infected(3).unwrap();
//!
//! let hour = context.update_city();
//! assert_eq!(hour, 1);
//! assert_eq!(context.get_counts().total(), 100);
//! assert_eq!(context.building_count(BuildingType::Restaurant), 2);
//! ```
//!
//! # Ticks
//!
//! [`ContextCityExt::update_city`] advances the clock one hour and then runs two phases:
//!
//! 1. Occupancy. Every building, in registry order, plans its movements from a snapshot of its
//!    occupants and the movements are applied before the next building is planned.
//! 2. Transmission. Every building plans its disease state changes from the post-occupancy
//!    state; all changes are applied together once every building has been planned, so no
//!    building sees another building's new infections within the same tick.
//!
//! A person is in exactly one building at all times and the city-wide S/I/R counts equal both
//! the sum of the per-building counts and the tally of every person's state.
use std::str::FromStr;
use std::sync::LazyLock;

use rand::seq::index::sample as choose_range;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::buildings::occupancy::{plan_occupancy, CityView, Movement};
use crate::buildings::transmission::plan_transmission;
use crate::buildings::{Building, BuildingId, BuildingRegistry, BuildingType, HospitalCapacity};
use crate::clock::Clock;
use crate::context::Context;
use crate::disease::new_infection;
use crate::error::CityError;
use crate::global_properties::ContextGlobalPropertiesExt;
use crate::parameters::{CityParameters, Parameters};
use crate::people::{DiseaseState, Person, PersonId, Population, SirCounts};
use crate::random::{init_random_if_unset, ContextRandomExt};
use crate::{debug, define_data_plugin, define_rng, info, trace, warn};

define_rng!(TransmissionRng);
define_rng!(SeedingRng);
define_rng!(VisitRng);
define_rng!(HiringRng);

/// Base seed used by `update_city` when `init_random` was never called.
pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Default)]
struct CityData {
    registry: BuildingRegistry,
    population: Population,
    clock: Clock,
}

define_data_plugin!(CityPlugin, CityData, CityData::default());

// Queries against a context with no city yet see an empty one.
static EMPTY_CITY: LazyLock<CityData> = LazyLock::new(CityData::default);
static DEFAULT_PARAMETERS: LazyLock<CityParameters> = LazyLock::new(CityParameters::default);

fn ensure_seeded(context: &mut Context) {
    if init_random_if_unset(context, DEFAULT_SEED) {
        warn!("no base seed set, seeding the city's random streams with {DEFAULT_SEED}");
    }
}

fn city_data(context: &Context) -> &CityData {
    context
        .get_data_container(CityPlugin)
        .unwrap_or(&*EMPTY_CITY)
}

impl CityData {
    fn add_household(&mut self, size: usize) -> (BuildingId, Vec<PersonId>) {
        let home = self.registry.construct(BuildingType::Home, None, 0);
        let mut residents = Vec::with_capacity(size);
        for _ in 0..size {
            let person_id = self.population.add_person(home);
            if let Some(building) = self.registry.get_mut(home) {
                building.add_occupant(person_id);
            }
            residents.push(person_id);
        }
        (home, residents)
    }

    /// Moves a person from wherever they are into `to`. Returns `false`, changing nothing, if
    /// the destination is full or doesn't exist, or the person is already there.
    fn move_person(&mut self, person_id: PersonId, to: BuildingId) -> bool {
        let Some(person) = self.population.get(person_id) else {
            return false;
        };
        let from = person.location();
        if from == to {
            return false;
        }
        let Some(destination) = self.registry.get_mut(to) else {
            return false;
        };
        if !destination.add_occupant(person_id) {
            return false;
        }
        if let Some(origin) = self.registry.get_mut(from) {
            origin.remove_occupant(person_id);
        }
        if let Some(person) = self.population.get_mut(person_id) {
            person.location = to;
        }
        true
    }

    /// Applies the movements planned for `building_id`, in order. Returns how many people moved.
    fn apply_movements(&mut self, building_id: BuildingId, movements: &[Movement]) -> usize {
        let mut moved = 0;
        for movement in movements {
            let done = match *movement {
                Movement::SendHome(person_id) => match self.population.get(person_id) {
                    Some(person) if person.location() == building_id => {
                        let home = person.home();
                        self.move_person(person_id, home)
                    }
                    _ => false,
                },
                Movement::Admit(person_id) => self.move_person(person_id, building_id),
            };
            if done {
                moved += 1;
            }
        }
        moved
    }

    fn employ(&mut self, person_id: PersonId, workplace: BuildingId) -> Result<(), CityError> {
        if self.population.get(person_id).is_none() {
            return Err(CityError::UnknownPerson(person_id));
        }
        let building = self
            .registry
            .get(workplace)
            .ok_or(CityError::UnknownBuilding(workplace))?;
        if !building.building_type().is_workplace() {
            return Err(CityError::NotAWorkplace(workplace));
        }
        self.hire(person_id, workplace);
        Ok(())
    }

    fn hire(&mut self, person_id: PersonId, workplace: BuildingId) {
        let Some(person) = self.population.get_mut(person_id) else {
            return;
        };
        if let Some(previous) = person.employer.replace(workplace) {
            if previous != workplace {
                if let Some(building) = self.registry.get_mut(previous) {
                    building.remove_employee(person_id);
                }
            }
        }
        if let Some(building) = self.registry.get_mut(workplace) {
            building.add_employee(person_id);
        }
    }
}

/// The S/I/R counts of a single building.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildingCounts {
    pub id: BuildingId,
    pub building_type: BuildingType,
    #[serde(flatten)]
    pub counts: SirCounts,
}

fn plan_building_occupancy(context: &Context, building_id: BuildingId, hour: u8) -> Vec<Movement> {
    let data = city_data(context);
    let Some(building) = data.registry.get(building_id) else {
        return Vec::new();
    };
    if building.building_type() == BuildingType::Home {
        return Vec::new();
    }
    let view = CityView {
        registry: &data.registry,
        population: &data.population,
        parameters: context.get_city_parameters(),
    };
    context.sample(VisitRng, |rng| plan_occupancy(building, hour, &view, rng))
}

fn plan_building_transmission(
    context: &Context,
    building_id: BuildingId,
) -> Vec<(PersonId, DiseaseState)> {
    let data = city_data(context);
    let Some(building) = data.registry.get(building_id) else {
        return Vec::new();
    };
    if building.size() == 0 {
        return Vec::new();
    }
    let parameters = context.get_city_parameters();
    context.sample(TransmissionRng, |rng| {
        plan_transmission(building, &data.population, parameters, rng)
    })
}

pub trait ContextCityExt {
    /// The parameters set with the `Parameters` global property, or the defaults.
    fn get_city_parameters(&self) -> &CityParameters;

    /// Appends `count` empty buildings of `building_type`, sized from the parameters. Hospitals
    /// get the default hospital capacity.
    fn construct_building(&mut self, building_type: BuildingType, count: usize) -> Vec<BuildingId>;

    /// Like [`ContextCityExt::construct_building`], taking the type as a case-insensitive tag
    /// such as `"restaurant"`.
    ///
    /// # Errors
    ///
    /// Returns `CityError::InvalidBuildingType` if the tag names no building type. Nothing is
    /// constructed in that case.
    fn construct_building_by_name(
        &mut self,
        building_type: &str,
        count: usize,
    ) -> Result<Vec<BuildingId>, CityError>;

    /// Appends `count` hospitals, each with `avg_beds` beds and `avg_workers` worker positions.
    fn construct_hospital(
        &mut self,
        count: usize,
        avg_beds: usize,
        avg_workers: usize,
    ) -> Vec<BuildingId>;

    fn construct_restaurants(&mut self, count: usize) -> Vec<BuildingId>;

    fn construct_offices(&mut self, count: usize) -> Vec<BuildingId>;

    fn construct_schools(&mut self, count: usize) -> Vec<BuildingId>;

    fn construct_stores(&mut self, count: usize) -> Vec<BuildingId>;

    /// Appends `count` hospitals with the default capacity.
    fn construct_hospitals(&mut self, count: usize) -> Vec<BuildingId>;

    /// Creates a home with one susceptible resident and returns the resident.
    fn add_home(&mut self) -> PersonId;

    /// Creates a home with `size` susceptible residents.
    fn add_household(&mut self, size: usize) -> (BuildingId, Vec<PersonId>);

    /// Creates `count` single-resident homes and returns their residents.
    fn add_homes(&mut self, count: usize) -> Vec<PersonId>;

    /// Makes `person_id` an employee of `workplace` (for a school, a student), replacing any
    /// previous employer.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPerson` or `UnknownBuilding` for ids that don't exist, and `NotAWorkplace`
    /// if `workplace` is a home.
    fn employ(&mut self, person_id: PersonId, workplace: BuildingId) -> Result<(), CityError>;

    /// Fills the open staff positions of every workplace with randomly chosen unemployed people.
    /// Returns the number hired.
    fn assign_workplaces(&mut self) -> usize;

    /// Infects `count` distinct susceptible people chosen at random and returns them.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientSusceptible` if fewer than `count` people are susceptible; no one
    /// is infected in that case.
    fn seed_infected(&mut self, count: usize) -> Result<Vec<PersonId>, CityError>;

    /// Runs one tick: advances the clock, then the occupancy phase, then the transmission phase.
    /// Returns the new hour. If `init_random` was never called the streams are seeded with
    /// [`DEFAULT_SEED`] first, as they are by `assign_workplaces` and `seed_infected`.
    fn update_city(&mut self) -> u8;

    /// Schedules `hours` ticks, one per unit of simulated time after the current time.
    fn schedule_hourly_updates(&mut self, hours: u32);

    fn get_counts(&self) -> SirCounts;

    /// Counts for every building, grouped by type.
    fn get_building_counts(&self) -> Vec<BuildingCounts>;

    fn get_clock(&self) -> Clock;

    fn get_person(&self, person_id: PersonId) -> Option<&Person>;

    /// Every person, in creation order.
    fn get_person_ids(&self) -> Vec<PersonId>;

    fn get_building(&self, building_id: BuildingId) -> Option<&Building>;

    fn get_buildings_of_type(&self, building_type: BuildingType) -> &[BuildingId];

    /// Every building, grouped by type.
    fn get_building_ids(&self) -> Vec<BuildingId>;

    fn building_count(&self, building_type: BuildingType) -> usize;

    fn population_size(&self) -> usize;
}

impl ContextCityExt for Context {
    fn get_city_parameters(&self) -> &CityParameters {
        self.get_global_property_value(Parameters)
            .unwrap_or(&*DEFAULT_PARAMETERS)
    }

    fn construct_building(&mut self, building_type: BuildingType, count: usize) -> Vec<BuildingId> {
        if building_type == BuildingType::Hospital {
            let hospital = self.get_city_parameters().default_hospital;
            return self.construct_hospital(count, hospital.beds, hospital.workers);
        }
        let (capacity, staff_positions) =
            match self.get_city_parameters().building_sizes.get(building_type) {
                Some(size) => (Some(size.capacity), size.staff_positions),
                None => (None, 0),
            };
        let registry = &mut self.get_data_container_mut(CityPlugin).registry;
        let ids: Vec<BuildingId> = (0..count)
            .map(|_| registry.construct(building_type, capacity, staff_positions))
            .collect();
        info!(
            "constructed {count} {building_type} buildings, {} buildings in total",
            registry.len()
        );
        ids
    }

    fn construct_building_by_name(
        &mut self,
        building_type: &str,
        count: usize,
    ) -> Result<Vec<BuildingId>, CityError> {
        let building_type = BuildingType::from_str(building_type)
            .map_err(|_| CityError::InvalidBuildingType(building_type.to_string()))?;
        Ok(self.construct_building(building_type, count))
    }

    fn construct_hospital(
        &mut self,
        count: usize,
        avg_beds: usize,
        avg_workers: usize,
    ) -> Vec<BuildingId> {
        let capacity = HospitalCapacity {
            beds: avg_beds,
            workers: avg_workers,
        };
        let registry = &mut self.get_data_container_mut(CityPlugin).registry;
        let ids: Vec<BuildingId> = (0..count)
            .map(|_| registry.construct_hospital(capacity))
            .collect();
        info!("constructed {count} hospitals with {avg_beds} beds and {avg_workers} workers");
        ids
    }

    fn construct_restaurants(&mut self, count: usize) -> Vec<BuildingId> {
        self.construct_building(BuildingType::Restaurant, count)
    }

    fn construct_offices(&mut self, count: usize) -> Vec<BuildingId> {
        self.construct_building(BuildingType::Office, count)
    }

    fn construct_schools(&mut self, count: usize) -> Vec<BuildingId> {
        self.construct_building(BuildingType::School, count)
    }

    fn construct_stores(&mut self, count: usize) -> Vec<BuildingId> {
        self.construct_building(BuildingType::Store, count)
    }

    fn construct_hospitals(&mut self, count: usize) -> Vec<BuildingId> {
        self.construct_building(BuildingType::Hospital, count)
    }

    fn add_home(&mut self) -> PersonId {
        let (_, residents) = self.add_household(1);
        residents[0]
    }

    fn add_household(&mut self, size: usize) -> (BuildingId, Vec<PersonId>) {
        let (home, residents) = self.get_data_container_mut(CityPlugin).add_household(size);
        trace!("added home {home} with {size} residents");
        (home, residents)
    }

    fn add_homes(&mut self, count: usize) -> Vec<PersonId> {
        let data = self.get_data_container_mut(CityPlugin);
        let residents: Vec<PersonId> = (0..count)
            .flat_map(|_| data.add_household(1).1)
            .collect();
        info!("added {count} homes");
        residents
    }

    fn employ(&mut self, person_id: PersonId, workplace: BuildingId) -> Result<(), CityError> {
        self.get_data_container_mut(CityPlugin)
            .employ(person_id, workplace)
    }

    fn assign_workplaces(&mut self) -> usize {
        let data = city_data(self);
        let mut candidates: Vec<PersonId> = data
            .population
            .iter()
            .filter(|person| person.employer().is_none())
            .map(Person::id)
            .collect();
        let openings: Vec<(BuildingId, usize)> = data
            .registry
            .iter()
            .filter(|building| building.building_type().is_workplace())
            .map(|building| {
                let open = building
                    .staff_positions()
                    .saturating_sub(building.employees().len());
                (building.id(), open)
            })
            .filter(|(_, open)| *open > 0)
            .collect();
        if candidates.is_empty() || openings.is_empty() {
            return 0;
        }

        ensure_seeded(self);
        self.sample(HiringRng, |rng| candidates.shuffle(rng));
        let data = self.get_data_container_mut(CityPlugin);
        let mut candidates = candidates.into_iter();
        let mut hired = 0;
        'hiring: for (workplace, open) in openings {
            for _ in 0..open {
                let Some(person_id) = candidates.next() else {
                    break 'hiring;
                };
                data.hire(person_id, workplace);
                hired += 1;
            }
        }
        info!("hired {hired} people");
        hired
    }

    fn seed_infected(&mut self, count: usize) -> Result<Vec<PersonId>, CityError> {
        let susceptible: Vec<PersonId> = city_data(self)
            .population
            .iter()
            .filter(|person| person.state().is_susceptible())
            .map(Person::id)
            .collect();
        if count > susceptible.len() {
            return Err(CityError::InsufficientSusceptible {
                requested: count,
                available: susceptible.len(),
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        ensure_seeded(self);
        let chosen: Vec<PersonId> = self.sample(SeedingRng, |rng| {
            choose_range(rng, susceptible.len(), count)
                .into_iter()
                .map(|index| susceptible[index])
                .collect()
        });
        let duration = self.get_city_parameters().infection_duration_hours;
        let population = &mut self.get_data_container_mut(CityPlugin).population;
        for &person_id in &chosen {
            population.set_state(person_id, new_infection(duration));
        }
        info!("seeded {count} infections");
        Ok(chosen)
    }

    fn update_city(&mut self) -> u8 {
        ensure_seeded(self);
        let hour = self.get_data_container_mut(CityPlugin).clock.advance();
        let building_ids = city_data(self).registry.ids();

        let mut moved = 0;
        for &building_id in &building_ids {
            let movements = plan_building_occupancy(self, building_id, hour);
            if movements.is_empty() {
                continue;
            }
            let applied = self
                .get_data_container_mut(CityPlugin)
                .apply_movements(building_id, &movements);
            trace!(
                "building {building_id}: {applied} of {} planned movements at hour {hour}",
                movements.len()
            );
            moved += applied;
        }

        let changes: Vec<(PersonId, DiseaseState)> = building_ids
            .iter()
            .flat_map(|&building_id| plan_building_transmission(self, building_id))
            .collect();
        let data = self.get_data_container_mut(CityPlugin);
        for &(person_id, state) in &changes {
            data.population.set_state(person_id, state);
        }

        let counts = data.population.counts();
        debug!(
            "{}: {moved} moved, S={} I={} R={}",
            data.clock, counts.susceptible, counts.infected, counts.recovered
        );
        hour
    }

    fn schedule_hourly_updates(&mut self, hours: u32) {
        let start = self.get_current_time();
        for hour in 1..=hours {
            self.add_plan(start + f64::from(hour), |context| {
                context.update_city();
            });
        }
    }

    fn get_counts(&self) -> SirCounts {
        city_data(self).population.counts()
    }

    fn get_building_counts(&self) -> Vec<BuildingCounts> {
        let data = city_data(self);
        data.registry
            .iter()
            .map(|building| BuildingCounts {
                id: building.id(),
                building_type: building.building_type(),
                counts: building.counts(&data.population),
            })
            .collect()
    }

    fn get_clock(&self) -> Clock {
        city_data(self).clock
    }

    fn get_person(&self, person_id: PersonId) -> Option<&Person> {
        city_data(self).population.get(person_id)
    }

    fn get_person_ids(&self) -> Vec<PersonId> {
        city_data(self).population.iter().map(Person::id).collect()
    }

    fn get_building(&self, building_id: BuildingId) -> Option<&Building> {
        city_data(self).registry.get(building_id)
    }

    fn get_buildings_of_type(&self, building_type: BuildingType) -> &[BuildingId] {
        city_data(self).registry.ids_of_type(building_type)
    }

    fn get_building_ids(&self) -> Vec<BuildingId> {
        city_data(self).registry.ids()
    }

    fn building_count(&self, building_type: BuildingType) -> usize {
        self.get_buildings_of_type(building_type).len()
    }

    fn population_size(&self) -> usize {
        city_data(self).population.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Shift;

    fn city_without_visitors() -> Context {
        let mut context = Context::new();
        context.init_random(42);
        let mut parameters = CityParameters::default();
        parameters.visitor_rates.restaurant = 0.0;
        parameters.visitor_rates.store = 0.0;
        parameters.hospitalization_probability = 0.0;
        context
            .set_global_property_value(Parameters, parameters)
            .unwrap();
        context
    }

    fn advance_to(context: &mut Context, hour: u8) {
        while context.get_clock().current_hour() != hour {
            context.update_city();
        }
    }

    fn place(context: &mut Context, person_id: PersonId, building_id: BuildingId) {
        assert!(context
            .get_data_container_mut(CityPlugin)
            .move_person(person_id, building_id));
    }

    fn restaurant_scene(context: &mut Context) -> (BuildingId, PersonId, Vec<PersonId>) {
        let restaurant = context.construct_restaurants(1)[0];
        let cook = context.add_home();
        let guests = context.add_homes(2);
        context.employ(cook, restaurant).unwrap();
        (restaurant, cook, guests)
    }

    #[test]
    fn empty_context_has_an_empty_city() {
        let context = Context::new();
        assert_eq!(context.get_counts(), SirCounts::default());
        assert!(context.get_building_counts().is_empty());
        assert_eq!(context.population_size(), 0);
        assert_eq!(context.get_clock(), Clock::new());
        assert!(context.get_city_parameters().validate().is_ok());
    }

    #[test]
    fn restaurant_closes_at_night() {
        let mut context = city_without_visitors();
        let (restaurant, cook, guests) = restaurant_scene(&mut context);
        advance_to(&mut context, 20);
        for &guest in &guests {
            place(&mut context, guest, restaurant);
        }
        assert_eq!(context.get_building(restaurant).unwrap().size(), 3);

        assert_eq!(context.update_city(), 21);
        let building = context.get_building(restaurant).unwrap();
        assert_eq!(building.occupants(), &[cook]);
        for &guest in &guests {
            assert!(context.get_person(guest).unwrap().is_at_home());
        }
    }

    #[test]
    fn restaurant_keeps_guests_while_open() {
        let mut context = city_without_visitors();
        let (restaurant, cook, guests) = restaurant_scene(&mut context);
        advance_to(&mut context, 14);
        for &guest in &guests {
            place(&mut context, guest, restaurant);
        }

        assert_eq!(context.update_city(), 15);
        let building = context.get_building(restaurant).unwrap();
        assert_eq!(building.size(), 3);
        assert!(building.contains(cook));
        for &guest in &guests {
            assert_eq!(context.get_person(guest).unwrap().location(), restaurant);
        }
    }

    #[test]
    fn employees_commute() {
        let mut context = city_without_visitors();
        let office = context.construct_offices(1)[0];
        let clerk = context.add_home();
        context.employ(clerk, office).unwrap();

        advance_to(&mut context, 9);
        assert_eq!(context.get_person(clerk).unwrap().location(), office);
        advance_to(&mut context, 17);
        assert!(context.get_person(clerk).unwrap().is_at_home());
        assert_eq!(context.get_building(office).unwrap().size(), 0);
    }

    #[test]
    fn full_building_rejects_admission() {
        let mut context = city_without_visitors();
        let mut parameters = context.get_city_parameters().clone();
        parameters.building_sizes.office.capacity = 1;
        context
            .set_global_property_value(Parameters, parameters)
            .unwrap();
        let office = context.construct_offices(1)[0];
        let clerks = context.add_homes(2);
        for &clerk in &clerks {
            context.employ(clerk, office).unwrap();
        }

        advance_to(&mut context, 10);
        assert_eq!(context.get_building(office).unwrap().size(), 1);
        let at_home = clerks
            .iter()
            .filter(|&&clerk| context.get_person(clerk).unwrap().is_at_home())
            .count();
        assert_eq!(at_home, 1);
    }

    #[test]
    fn send_home_only_moves_occupants() {
        let mut context = city_without_visitors();
        let office = context.construct_offices(1)[0];
        let person = context.add_home();
        let data = context.get_data_container_mut(CityPlugin);
        assert_eq!(
            data.apply_movements(office, &[Movement::SendHome(person)]),
            0
        );
        assert!(context.get_person(person).unwrap().is_at_home());
    }

    #[test]
    fn construct_by_name() {
        let mut context = Context::new();
        let ids = context.construct_building_by_name("Store", 2).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(context.building_count(BuildingType::Store), 2);
        let store = context.get_building(ids[0]).unwrap();
        assert_eq!(store.capacity(), Some(30));
        assert_eq!(store.staff_positions(), 4);
    }

    #[test]
    fn unknown_building_type_constructs_nothing() {
        let mut context = Context::new();
        context.add_homes(2);
        let result = context.construct_building_by_name("castle", 3);
        assert!(matches!(
            result,
            Err(CityError::InvalidBuildingType(ref name)) if name == "castle"
        ));
        assert_eq!(context.get_building_ids().len(), 2);
    }

    #[test]
    fn households_share_a_home() {
        let mut context = Context::new();
        let (home, residents) = context.add_household(4);
        assert_eq!(residents.len(), 4);
        assert_eq!(context.get_building(home).unwrap().occupants(), &residents[..]);
        for &resident in &residents {
            let person = context.get_person(resident).unwrap();
            assert_eq!(person.home(), home);
            assert!(person.state().is_susceptible());
        }
    }

    #[test]
    fn employ_validates_and_replaces() {
        let mut context = Context::new();
        let person = context.add_home();
        let home = context.get_person(person).unwrap().home();
        let office = context.construct_offices(1)[0];
        let store = context.construct_stores(1)[0];

        assert!(matches!(
            context.employ(person, home),
            Err(CityError::NotAWorkplace(id)) if id == home
        ));
        assert!(matches!(
            context.employ(PersonId(10), office),
            Err(CityError::UnknownPerson(_))
        ));
        assert!(matches!(
            context.employ(person, BuildingId(10)),
            Err(CityError::UnknownBuilding(_))
        ));

        context.employ(person, office).unwrap();
        context.employ(person, store).unwrap();
        assert_eq!(context.get_person(person).unwrap().employer(), Some(store));
        assert!(context.get_building(office).unwrap().employees().is_empty());
        assert_eq!(context.get_building(store).unwrap().employees(), &[person]);
    }

    #[test]
    fn assign_workplaces_fills_positions() {
        let mut context = Context::new();
        context.init_random(1);
        context.add_homes(10);
        let restaurant = context.construct_restaurants(1)[0];
        let store = context.construct_stores(1)[0];

        // 5 restaurant positions and 4 store positions.
        assert_eq!(context.assign_workplaces(), 9);
        assert_eq!(context.get_building(restaurant).unwrap().employees().len(), 5);
        assert_eq!(context.get_building(store).unwrap().employees().len(), 4);
        let unemployed = context
            .get_person_ids()
            .into_iter()
            .filter(|&person| context.get_person(person).unwrap().employer().is_none())
            .count();
        assert_eq!(unemployed, 1);

        assert_eq!(context.assign_workplaces(), 0);
    }

    #[test]
    fn seed_infected_picks_distinct_susceptibles() {
        let mut context = Context::new();
        context.init_random(8);
        context.add_homes(20);
        let seeded = context.seed_infected(5).unwrap();
        let mut unique = seeded.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert_eq!(context.get_counts().infected, 5);
        for person in seeded {
            assert_eq!(
                context.get_person(person).unwrap().state(),
                DiseaseState::Infected {
                    hours_remaining: context.get_city_parameters().infection_duration_hours
                }
            );
        }
    }

    #[test]
    fn seed_infected_fails_without_mutation() {
        let mut context = Context::new();
        context.init_random(8);
        context.add_homes(2);
        let result = context.seed_infected(5);
        assert!(matches!(
            result,
            Err(CityError::InsufficientSusceptible {
                requested: 5,
                available: 2
            })
        ));
        assert_eq!(context.get_counts().susceptible, 2);
    }

    #[test]
    fn hospital_treats_patients() {
        let mut context = Context::new();
        context.init_random(3);
        let mut parameters = CityParameters::default();
        parameters.hospitalization_probability = 1.0;
        parameters.infection_duration_hours = 10;
        parameters.treatment_speedup = 1;
        parameters.transmissibility.hospital = 0.0;
        parameters.transmissibility.home = 0.0;
        parameters.shifts.hospital = Shift { start: 0, end: 24 };
        context
            .set_global_property_value(Parameters, parameters)
            .unwrap();

        let hospital = context.construct_hospital(1, 2, 1)[0];
        let patient = context.add_home();
        assert_eq!(context.seed_infected(1).unwrap(), vec![patient]);
        let doctor = context.add_home();
        context.employ(doctor, hospital).unwrap();

        // Admitted and treated in the first hour.
        context.update_city();
        let person = context.get_person(patient).unwrap();
        assert_eq!(person.location(), hospital);
        assert_eq!(
            person.state(),
            DiseaseState::Infected { hours_remaining: 8 }
        );
        assert_eq!(context.get_person(doctor).unwrap().location(), hospital);

        for _ in 0..10 {
            context.update_city();
        }
        let person = context.get_person(patient).unwrap();
        assert!(person.state().is_recovered());
        assert!(person.is_at_home());
        assert!(context
            .get_building(hospital)
            .unwrap()
            .non_employees()
            .next()
            .is_none());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn scheduled_updates_run_each_hour() {
        let mut context = Context::new();
        context.init_random(5);
        context.add_homes(3);
        context.schedule_hourly_updates(30);
        context.execute();
        let clock = context.get_clock();
        assert_eq!(clock.current_day(), 1);
        assert_eq!(clock.current_hour(), 6);
        assert_eq!(context.get_current_time(), 30.0);
    }

    #[test]
    fn unseeded_city_ticks_with_default_seed() {
        let build = |context: &mut Context| {
            context.add_homes(40);
            context.construct_restaurants(1);
            context.construct_stores(1);
            context.construct_hospitals(1);
            context.assign_workplaces();
            context.seed_infected(3).unwrap();
        };

        let mut unseeded = Context::new();
        build(&mut unseeded);
        let mut seeded = Context::new();
        seeded.init_random(DEFAULT_SEED);
        build(&mut seeded);

        for _ in 0..48 {
            assert_eq!(unseeded.update_city(), seeded.update_city());
            assert_eq!(unseeded.get_counts(), seeded.get_counts());
        }
        assert_eq!(unseeded.get_counts().total(), 40);
    }

    #[test]
    fn explicit_seed_is_not_replaced() {
        let mut ticked = Context::new();
        ticked.init_random(17);
        ticked.add_homes(50);
        ticked.update_city();

        let mut reference = Context::new();
        reference.init_random(17);
        reference.add_homes(50);

        assert_eq!(
            ticked.seed_infected(5).unwrap(),
            reference.seed_infected(5).unwrap()
        );
    }

    #[test]
    fn hospital_staff_go_home_after_their_shift() {
        let mut context = city_without_visitors();
        let hospital = context.construct_hospitals(1)[0];
        let nurse = context.add_home();
        context.employ(nurse, hospital).unwrap();

        let mut hours_at_home = 0;
        let mut hours_at_work = 0;
        for _ in 0..24 {
            let hour = context.update_city();
            let location = context.get_person(nurse).unwrap().location();
            let on_shift = context
                .get_city_parameters()
                .shifts
                .hospital
                .contains(hour);
            if on_shift {
                assert_eq!(location, hospital);
                hours_at_work += 1;
            } else {
                assert!(context.get_person(nurse).unwrap().is_at_home());
                hours_at_home += 1;
            }
        }
        assert!(hours_at_home > 0);
        assert!(hours_at_work > 0);
    }

    #[test]
    fn infected_hospital_worker_is_admitted_from_home() {
        let mut context = Context::new();
        context.init_random(4);
        let mut parameters = CityParameters::default();
        parameters.hospitalization_probability = 1.0;
        parameters.transmissibility.home = 0.0;
        context
            .set_global_property_value(Parameters, parameters)
            .unwrap();

        let workplace = context.construct_hospital(1, 2, 1)[0];
        let other = context.construct_hospital(1, 2, 1)[0];
        let nurse = context.add_home();
        context.employ(nurse, workplace).unwrap();
        assert_eq!(context.seed_infected(1).unwrap(), vec![nurse]);

        // Off shift at night, so the nurse is at home and gets a bed in the other hospital.
        context.update_city();
        assert_eq!(context.get_person(nurse).unwrap().location(), other);
    }

    #[test]
    fn building_counts_serialize_flat() {
        let counts = BuildingCounts {
            id: BuildingId(3),
            building_type: BuildingType::School,
            counts: SirCounts {
                susceptible: 2,
                infected: 1,
                recovered: 0,
            },
        };
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"id":3,"building_type":"school","S":2,"I":1,"R":0}"#
        );
    }
}
