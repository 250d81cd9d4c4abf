use ixa_city::prelude::*;
use ixa_city::{Building, SirCounts};

fn build_city(seed: u64) -> Context {
    let mut context = Context::new();
    context.init_random(seed);
    let mut parameters = CityParameters::default();
    // Make sure the run sees infections in every kind of building.
    parameters.transmissibility.home = 0.2;
    parameters.transmissibility.office = 0.3;
    parameters.transmissibility.restaurant = 0.5;
    parameters.infection_duration_hours = 36;
    parameters.hospitalization_probability = 0.05;
    context
        .set_global_property_value(Parameters, parameters)
        .unwrap();

    context.add_homes(150);
    context.add_household(4);
    context.construct_restaurants(2);
    context.construct_offices(2);
    context.construct_schools(1);
    context.construct_stores(2);
    context.construct_hospital(1, 6, 3);
    context.assign_workplaces();
    context.seed_infected(10).unwrap();
    context
}

fn check_invariants(context: &Context) {
    let counts = context.get_counts();

    let by_building: SirCounts = context
        .get_building_counts()
        .iter()
        .map(|building| building.counts)
        .sum();
    assert_eq!(counts, by_building);

    let mut by_person = SirCounts::default();
    for person_id in context.get_person_ids() {
        let person = context.get_person(person_id).unwrap();
        by_person.add(person.state());

        // Everyone is in exactly one building.
        let containing = context
            .get_building_ids()
            .into_iter()
            .filter(|&building_id| context.get_building(building_id).unwrap().contains(person_id))
            .count();
        assert_eq!(containing, 1);
        assert!(context
            .get_building(person.location())
            .unwrap()
            .contains(person_id));
    }
    assert_eq!(counts, by_person);
    assert_eq!(counts.total(), context.population_size());

    for building_id in context.get_building_ids() {
        let building: &Building = context.get_building(building_id).unwrap();
        if let Some(capacity) = building.capacity() {
            assert!(building.size() <= capacity);
        }
    }
}

#[test]
fn counts_agree_every_tick() {
    let mut context = build_city(11);
    check_invariants(&context);
    for _ in 0..72 {
        context.update_city();
        check_invariants(&context);
    }
    assert!(context.get_counts().recovered > 0);
}

#[test]
fn counts_query_is_idempotent() {
    let mut context = build_city(12);
    for _ in 0..30 {
        context.update_city();
    }
    assert_eq!(context.get_counts(), context.get_counts());
    assert_eq!(context.get_building_counts(), context.get_building_counts());
}

#[test]
fn clock_wraps_after_24_ticks() {
    let mut context = build_city(13);
    let hours: Vec<u8> = (0..24).map(|_| context.update_city()).collect();
    let expected: Vec<u8> = (1..24).chain([0]).collect();
    assert_eq!(hours, expected);
    assert_eq!(context.get_clock().current_day(), 1);
}

#[test]
fn same_seed_same_epidemic() {
    let mut first = build_city(21);
    let mut second = build_city(21);
    for _ in 0..48 {
        first.update_city();
        second.update_city();
        assert_eq!(first.get_counts(), second.get_counts());
    }
}

#[test]
fn construct_hospital_leaves_other_buildings_alone() {
    let mut context = build_city(14);
    for _ in 0..10 {
        context.update_city();
    }
    let before = context.get_building_counts();
    let hospitals_before = context.building_count(BuildingType::Hospital);

    let hospitals = context.construct_hospital(3, 10, 5);
    assert_eq!(hospitals.len(), 3);
    assert_eq!(
        context.building_count(BuildingType::Hospital),
        hospitals_before + 3
    );
    for hospital in &hospitals {
        let building = context.get_building(*hospital).unwrap();
        assert_eq!(building.building_type(), BuildingType::Hospital);
        let capacity = building.hospital_capacity().unwrap();
        assert_eq!(capacity.beds, 10);
        assert_eq!(capacity.workers, 5);
        assert_eq!(building.size(), 0);
    }

    let after = context.get_building_counts();
    for counts in &before {
        assert!(after.contains(counts));
    }
    assert_eq!(after.len(), before.len() + 3);
}

#[test]
fn no_infection_without_seeds() {
    let mut context = Context::new();
    context.init_random(15);
    context.add_homes(30);
    context.construct_restaurants(1);
    context.construct_offices(1);
    context.assign_workplaces();
    for _ in 0..48 {
        context.update_city();
    }
    assert_eq!(
        context.get_counts(),
        SirCounts {
            susceptible: 30,
            infected: 0,
            recovered: 0
        }
    );
}

#[test]
fn epidemic_runs_its_course() {
    let mut context = build_city(16);
    context.schedule_hourly_updates(24 * 20);
    context.execute();
    assert_eq!(context.get_clock().current_day(), 20);
    // The seeded infections have long since recovered.
    assert!(context.get_counts().recovered >= 10);
    check_invariants(&context);
}

#[test]
fn city_ticks_without_a_seed() {
    let mut context = Context::new();
    context.add_homes(2);
    assert_eq!(context.update_city(), 1);
    check_invariants(&context);
}

#[test]
fn hospital_workers_spend_part_of_each_day_at_home() {
    let mut context = Context::new();
    context.init_random(17);
    let hospital = context.construct_hospitals(1)[0];
    let worker = context.add_home();
    context.employ(worker, hospital).unwrap();

    let hours_at_home = (0..24 * 7)
        .filter(|_| {
            context.update_city();
            context.get_person(worker).unwrap().is_at_home()
        })
        .count();
    assert!(hours_at_home > 0);
    assert!(hours_at_home < 24 * 7);
}
