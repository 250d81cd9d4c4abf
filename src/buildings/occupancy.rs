//! Occupancy rules: who enters and who leaves each building at a given hour.
//!
//! Each building type has its own rule. A rule only reads the city; it returns a list of
//! [`Movement`]s which the city applies once the rule has looked at every occupant. Working from
//! the unchanged occupant list means every occupant is considered exactly once no matter how many
//! are sent home in the same pass.
//!
//! | type       | visitors                                   | employees         |
//! |------------|--------------------------------------------|-------------------|
//! | home       | residents only, never evicted              | none              |
//! | office     | none, anyone else is sent home             | present on shift  |
//! | school     | none, anyone else is sent home             | present on shift  |
//! | restaurant | stay until closing                         | present on shift  |
//! | store      | stay one hour                              | present on shift  |
//! | hospital   | infected patients, discharged on recovery  | present on shift  |
use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::buildings::{Building, BuildingRegistry, BuildingType};
use crate::parameters::{CityParameters, OpeningHours, Shift};
use crate::people::{Person, PersonId, Population};
use crate::{HashSet, HashSetExt};

/// A read-only view of the city handed to occupancy and transmission rules.
pub(crate) struct CityView<'a> {
    pub(crate) registry: &'a BuildingRegistry,
    pub(crate) population: &'a Population,
    pub(crate) parameters: &'a CityParameters,
}

impl CityView<'_> {
    /// A patient is someone in a hospital they don't work at.
    pub(crate) fn is_hospitalized(&self, person: &Person) -> bool {
        self.registry
            .get(person.location())
            .is_some_and(|building| {
                building.building_type() == BuildingType::Hospital
                    && !building.is_employee(person.id())
            })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Movement {
    /// Send the person from this building back to their home.
    SendHome(PersonId),
    /// Bring the person into this building from wherever they are.
    Admit(PersonId),
}

/// Plans the movements into and out of `building` at `hour`.
pub(crate) fn plan_occupancy<R: Rng + ?Sized>(
    building: &Building,
    hour: u8,
    view: &CityView,
    rng: &mut R,
) -> Vec<Movement> {
    let parameters = view.parameters;
    match building.building_type() {
        BuildingType::Home => Vec::new(),
        BuildingType::Office | BuildingType::School => {
            let mut movements = send_home_all_visitors(building);
            movements.extend(shift_movements(building, hour, view));
            movements
        }
        BuildingType::Restaurant => {
            let hours = parameters.restaurant_hours;
            // Guests stay until closing.
            let mut movements = if accepts_visitors(hours, hour) {
                Vec::new()
            } else {
                send_home_all_visitors(building)
            };
            movements.extend(shift_movements(building, hour, view));
            if accepts_visitors(hours, hour) {
                movements.extend(draw_visitors(
                    building,
                    parameters.visitor_rates.restaurant,
                    view,
                    rng,
                ));
            }
            movements
        }
        BuildingType::Store => {
            // Shoppers stay for a single hour.
            let mut movements = send_home_all_visitors(building);
            movements.extend(shift_movements(building, hour, view));
            if accepts_visitors(parameters.store_hours, hour) {
                movements.extend(draw_visitors(
                    building,
                    parameters.visitor_rates.store,
                    view,
                    rng,
                ));
            }
            movements
        }
        BuildingType::Hospital => hospital_movements(building, hour, view, rng),
    }
}

fn accepts_visitors(hours: OpeningHours, hour: u8) -> bool {
    hours.is_open(hour) && !hours.is_closing(hour)
}

fn send_home_all_visitors(building: &Building) -> Vec<Movement> {
    building.non_employees().map(Movement::SendHome).collect()
}

/// Employees come in at the start of their shift and go home at its end. Employees who are
/// hospital patients stay where they are.
fn shift_movements(building: &Building, hour: u8, view: &CityView) -> Vec<Movement> {
    let Some(shift) = view.parameters.shifts.get(building.building_type()) else {
        return Vec::new();
    };
    building
        .employees()
        .iter()
        .filter_map(|&employee| view.population.get(employee))
        .filter_map(|person| shift_movement(building, shift, hour, person, view))
        .collect()
}

fn shift_movement(
    building: &Building,
    shift: Shift,
    hour: u8,
    person: &Person,
    view: &CityView,
) -> Option<Movement> {
    let at_work = person.location() == building.id();
    if shift.contains(hour) {
        (!at_work && !view.is_hospitalized(person)).then_some(Movement::Admit(person.id()))
    } else {
        at_work.then_some(Movement::SendHome(person.id()))
    }
}

/// Draws a Poisson number of arrivals and admits those who are at home. People who are out
/// somewhere else when drawn don't come.
fn draw_visitors<R: Rng + ?Sized>(
    building: &Building,
    rate: f64,
    view: &CityView,
    rng: &mut R,
) -> Vec<Movement> {
    let population_size = view.population.len();
    let Ok(arrivals) = Poisson::new(rate) else {
        // Zero rate.
        return Vec::new();
    };
    if population_size == 0 {
        return Vec::new();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let arrivals = (arrivals.sample(rng) as usize).min(population_size);
    let mut drawn = HashSet::new();
    let mut visitors = Vec::with_capacity(arrivals);
    for _ in 0..arrivals {
        let person_id = PersonId(rng.random_range(0..population_size));
        let Some(person) = view.population.get(person_id) else {
            continue;
        };
        if person.is_at_home() && !building.is_employee(person_id) && drawn.insert(person_id) {
            visitors.push(Movement::Admit(person_id));
        }
    }
    visitors
}

/// Discharges recovered patients, keeps the staff on shift, and admits infected people from
/// their homes while beds are free.
fn hospital_movements<R: Rng + ?Sized>(
    building: &Building,
    hour: u8,
    view: &CityView,
    rng: &mut R,
) -> Vec<Movement> {
    let mut movements = Vec::new();
    let mut occupied_beds = 0;
    for patient in building.non_employees() {
        if view.population.state(patient).is_infected() {
            occupied_beds += 1;
        } else {
            movements.push(Movement::SendHome(patient));
        }
    }

    movements.extend(shift_movements(building, hour, view));

    let beds = building
        .hospital_capacity()
        .map_or(0, |capacity| capacity.beds);
    let mut free_beds = beds.saturating_sub(occupied_beds);
    let p = view.parameters.hospitalization_probability;
    if free_beds == 0 || p <= 0.0 {
        return movements;
    }
    for person in view.population.iter() {
        if free_beds == 0 {
            break;
        }
        if person.state().is_infected()
            && person.is_at_home()
            && !building.is_employee(person.id())
            && rng.random_bool(p)
        {
            movements.push(Movement::Admit(person.id()));
            free_beds -= 1;
        }
    }
    movements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{BuildingId, HospitalCapacity};
    use crate::parameters::MAX_VISITOR_RATE;
    use crate::people::DiseaseState;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixture {
        registry: BuildingRegistry,
        population: Population,
        parameters: CityParameters,
    }

    impl Fixture {
        fn new() -> Fixture {
            Fixture {
                registry: BuildingRegistry::default(),
                population: Population::default(),
                parameters: CityParameters::default(),
            }
        }

        fn resident(&mut self) -> PersonId {
            let home = self.registry.construct(BuildingType::Home, None, 0);
            let person_id = self.population.add_person(home);
            self.registry.get_mut(home).unwrap().add_occupant(person_id);
            person_id
        }

        /// Moves a person into `building`, bypassing the rules.
        fn place(&mut self, person_id: PersonId, building_id: BuildingId) {
            let from = self.population.get(person_id).unwrap().location();
            self.registry.get_mut(from).unwrap().remove_occupant(person_id);
            self.registry.get_mut(building_id).unwrap().add_occupant(person_id);
            self.population.get_mut(person_id).unwrap().location = building_id;
        }

        fn employ(&mut self, person_id: PersonId, building_id: BuildingId) {
            self.registry.get_mut(building_id).unwrap().add_employee(person_id);
            self.population.get_mut(person_id).unwrap().employer = Some(building_id);
        }

        fn plan(&self, building_id: BuildingId, hour: u8) -> Vec<Movement> {
            let view = CityView {
                registry: &self.registry,
                population: &self.population,
                parameters: &self.parameters,
            };
            let mut rng = SmallRng::seed_from_u64(7);
            plan_occupancy(self.registry.get(building_id).unwrap(), hour, &view, &mut rng)
        }
    }

    fn restaurant_with_guests(fixture: &mut Fixture) -> (BuildingId, PersonId, [PersonId; 2]) {
        let restaurant = fixture
            .registry
            .construct(BuildingType::Restaurant, Some(40), 1);
        let cook = fixture.resident();
        let guests = [fixture.resident(), fixture.resident()];
        fixture.employ(cook, restaurant);
        fixture.place(cook, restaurant);
        for guest in guests {
            fixture.place(guest, restaurant);
        }
        (restaurant, cook, guests)
    }

    #[test]
    fn restaurant_sends_guests_home_after_closing() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.restaurant = 0.0;
        let (restaurant, cook, guests) = restaurant_with_guests(&mut fixture);

        let movements = fixture.plan(restaurant, 21);
        assert_eq!(movements.len(), 2);
        for guest in guests {
            assert!(movements.contains(&Movement::SendHome(guest)));
        }
        assert!(!movements.contains(&Movement::SendHome(cook)));
    }

    #[test]
    fn restaurant_sends_guests_home_before_opening() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.restaurant = 0.0;
        let (restaurant, cook, guests) = restaurant_with_guests(&mut fixture);

        // The cook's shift has started but the doors are not open yet.
        let movements = fixture.plan(restaurant, 9);
        assert_eq!(movements.len(), 2);
        for guest in guests {
            assert!(movements.contains(&Movement::SendHome(guest)));
        }
        assert!(!movements.contains(&Movement::SendHome(cook)));
    }

    #[test]
    fn visitor_arrivals_are_bounded_by_population() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.store = MAX_VISITOR_RATE;
        let store = fixture.registry.construct(BuildingType::Store, Some(30), 0);
        let residents: Vec<PersonId> = (0..3).map(|_| fixture.resident()).collect();

        let movements = fixture.plan(store, 12);
        assert!(!movements.is_empty());
        assert!(movements.len() <= residents.len());
    }

    #[test]
    fn restaurant_sends_guests_home_at_closing_hour() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.restaurant = 0.0;
        let (restaurant, _, guests) = restaurant_with_guests(&mut fixture);

        let movements = fixture.plan(restaurant, 20);
        for guest in guests {
            assert!(movements.contains(&Movement::SendHome(guest)));
        }
    }

    #[test]
    fn restaurant_keeps_guests_while_open() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.restaurant = 0.0;
        let (restaurant, _, _) = restaurant_with_guests(&mut fixture);

        assert!(fixture.plan(restaurant, 15).is_empty());
    }

    #[test]
    fn restaurant_admits_visitors_only_while_open() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.restaurant = 50.0;
        let restaurant = fixture
            .registry
            .construct(BuildingType::Restaurant, Some(40), 0);
        for _ in 0..10 {
            fixture.resident();
        }

        let movements = fixture.plan(restaurant, 12);
        assert!(!movements.is_empty());
        assert!(movements
            .iter()
            .all(|movement| matches!(movement, Movement::Admit(_))));
        let mut admitted: Vec<_> = movements.clone();
        admitted.dedup();
        assert_eq!(admitted.len(), movements.len());

        assert!(fixture.plan(restaurant, 3).is_empty());
    }

    #[test]
    fn office_follows_shift() {
        let mut fixture = Fixture::new();
        let office = fixture.registry.construct(BuildingType::Office, Some(10), 1);
        let clerk = fixture.resident();
        fixture.employ(clerk, office);

        assert!(fixture.plan(office, 8).is_empty());
        assert_eq!(fixture.plan(office, 9), vec![Movement::Admit(clerk)]);

        fixture.place(clerk, office);
        assert!(fixture.plan(office, 12).is_empty());
        assert_eq!(fixture.plan(office, 17), vec![Movement::SendHome(clerk)]);
    }

    #[test]
    fn office_sends_strangers_home() {
        let mut fixture = Fixture::new();
        let office = fixture.registry.construct(BuildingType::Office, Some(10), 1);
        let stranger = fixture.resident();
        fixture.place(stranger, office);
        assert_eq!(fixture.plan(office, 10), vec![Movement::SendHome(stranger)]);
    }

    #[test]
    fn hospitalized_employee_stays_in_hospital() {
        let mut fixture = Fixture::new();
        let office = fixture.registry.construct(BuildingType::Office, Some(10), 1);
        let hospital = fixture.registry.construct_hospital(HospitalCapacity {
            beds: 2,
            workers: 1,
        });
        let clerk = fixture.resident();
        fixture.employ(clerk, office);
        fixture.place(clerk, hospital);
        assert!(fixture.plan(office, 9).is_empty());
    }

    #[test]
    fn store_visits_last_one_hour() {
        let mut fixture = Fixture::new();
        fixture.parameters.visitor_rates.store = 0.0;
        let store = fixture.registry.construct(BuildingType::Store, Some(30), 0);
        let shopper = fixture.resident();
        fixture.place(shopper, store);
        assert_eq!(fixture.plan(store, 11), vec![Movement::SendHome(shopper)]);
    }

    #[test]
    fn hospital_admits_and_discharges() {
        let mut fixture = Fixture::new();
        fixture.parameters.hospitalization_probability = 1.0;
        let hospital = fixture.registry.construct_hospital(HospitalCapacity {
            beds: 1,
            workers: 1,
        });
        let sick = [fixture.resident(), fixture.resident()];
        let healthy = fixture.resident();
        for person_id in sick {
            fixture
                .population
                .set_state(person_id, DiseaseState::Infected { hours_remaining: 5 });
        }

        // Only one bed.
        let movements = fixture.plan(hospital, 3);
        assert_eq!(movements, vec![Movement::Admit(sick[0])]);
        assert!(!movements.contains(&Movement::Admit(healthy)));

        fixture.place(sick[0], hospital);
        assert!(fixture.plan(hospital, 4).is_empty());

        fixture.population.set_state(sick[0], DiseaseState::Recovered);
        let movements = fixture.plan(hospital, 5);
        assert_eq!(movements[0], Movement::SendHome(sick[0]));
    }
}
