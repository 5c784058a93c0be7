//! End-to-end population growth and collapse scenarios.

mod common;

use common::ConstantHabitat;
use megafauna::core::output::MemoryWriter;
use megafauna::core::parameters::Parameters;
use megafauna::core::{SimDayOptions, World};
use megafauna_data::{Date, Hft, MortalityFactor, OutputInterval};

fn run_days(world: &mut World, days: u32) {
    let mut date = Date::new(0, 0).unwrap();
    for _ in 0..days {
        world.simulate_day(date, &SimDayOptions::default()).unwrap();
        date = date.next();
    }
}

fn build_world(hft: Hft, habitat: ConstantHabitat) -> World {
    let params = Parameters {
        output_interval: OutputInterval::Daily,
        ..Parameters::default()
    };
    let mut world = World::new(params, vec![hft], Box::new(MemoryWriter::new())).unwrap();
    world.create_simulation_unit(Box::new(habitat));
    world
}

#[test]
fn immortal_population_grows_by_reproduction() {
    // Ten immortal 100-kg grazers (half of them female) on abundant
    // grass, reproducing at a constant one calf per female and year:
    // after one year the density has grown by about five newborns.
    let mut world = build_world(common::scenario_hft(), ConstantHabitat::new(1.0e4, 0.6));
    run_days(&mut world, 365);

    let population = &world.sim_units()[0].populations()[0];
    assert!(population.ind_per_km2() >= 10.0);

    let newborns: f64 = population
        .cohorts()
        .iter()
        .filter(|cohort| cohort.age_year_class() == 0)
        .map(|cohort| cohort.ind_per_km2())
        .sum();
    let expected = 10.0 / 2.0 * 1.0;
    assert!(
        (newborns - expected).abs() / expected < 0.05,
        "expected about {expected} newborns, got {newborns}"
    );
}

#[test]
fn eaten_forage_never_exceeds_available() {
    let mut world = build_world(common::scenario_hft(), ConstantHabitat::new(1.0e4, 0.6));
    let mut date = Date::new(0, 0).unwrap();
    for _ in 0..100 {
        world.simulate_day(date, &SimDayOptions::default()).unwrap();
        let eaten = world.sim_units()[0]
            .current_output()
            .habitat
            .eaten_forage
            .sum();
        assert!(eaten <= 1.0e4);
        date = date.next();
    }
}

#[test]
fn starvation_collapse_purges_population() {
    // The same grazers with a starvation threshold of 10 % body fat, no
    // grass at all and poor initial condition: the population starves,
    // falls below the viability threshold and is purged within 30 days.
    let hft = Hft {
        mortality_factors: vec![MortalityFactor::StarvationThreshold],
        mortality_minimum_body_fat: 0.1,
        establishment_body_condition: 0.15,
        ..common::scenario_hft()
    };
    let mut world = build_world(hft, ConstantHabitat::new(0.0, 0.6));

    let mut date = Date::new(0, 0).unwrap();
    let mut collapsed_after = None;
    for day in 0..30 {
        world.simulate_day(date, &SimDayOptions::default()).unwrap();
        if world.sim_units()[0].populations()[0].is_empty() {
            collapsed_after = Some(day + 1);
            break;
        }
        date = date.next();
    }
    let days = collapsed_after.expect("population should collapse within 30 days");
    assert!(days <= 30);
}

#[test]
fn background_mortality_thins_the_population() {
    let hft = Hft {
        mortality_factors: vec![MortalityFactor::Background],
        mortality_background_adult: 0.1,
        mortality_background_juvenile: 0.3,
        reproduction_annual_maximum: 0.0,
        ..common::scenario_hft()
    };
    let mut world = build_world(hft, ConstantHabitat::new(1.0e4, 0.6));
    run_days(&mut world, 365);

    let density = world.sim_units()[0].populations()[0].ind_per_km2();
    // All established animals are adults: one year of 10 % annual
    // mortality leaves about nine of the ten.
    assert!((density - 9.0).abs() < 0.1);
}

#[test]
fn density_is_monotonic_between_offspring_events() {
    // Outside the breeding season a cohort's density never increases.
    let hft = Hft {
        mortality_factors: vec![MortalityFactor::Background],
        reproduction_annual_maximum: 0.0,
        ..common::scenario_hft()
    };
    let mut world = build_world(hft, ConstantHabitat::new(1.0e4, 0.6));
    let mut date = Date::new(0, 0).unwrap();
    let mut last_density = f64::INFINITY;
    for _ in 0..100 {
        world.simulate_day(date, &SimDayOptions::default()).unwrap();
        let density = world.sim_units()[0].populations()[0].ind_per_km2();
        assert!(density <= last_density + 1e-12);
        last_density = density;
        date = date.next();
    }
}
