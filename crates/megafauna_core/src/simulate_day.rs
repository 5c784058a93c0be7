//! Simulation of one day in one simulation unit.

use crate::error::{Result, SimError};
use crate::feed::{DistributeForage, ForageDistribution};
use crate::simulation_unit::SimulationUnit;
use megafauna_data::{
    CombinedData, ForageMass, ForageType, HabitatData, HerbivoreData,
};
use std::collections::BTreeMap;

/// Forage below this mass [kgDM/km²] is treated as zero to avoid errors
/// from rounding inaccuracy.
const NEGLIGIBLE_FORAGE_MASS: f64 = 0.01;

/// Perform one day's stage pipeline for one simulation unit:
/// habitat init → herbivore simulation → demand → distribution → feeding →
/// offspring → purge → output.
///
/// With `do_herbivores == false` only the habitat is initialized and its
/// output recorded. `establish_as_needed` re-creates empty populations
/// before the day begins.
pub fn simulate_day(
    day: u16,
    unit: &mut SimulationUnit,
    distribute_forage: &dyn DistributeForage,
    do_herbivores: bool,
    establish_as_needed: bool,
) -> Result<()> {
    if day > 364 {
        return Err(SimError::invalid("day must be within [0,364]"));
    }

    unit.habitat.init_day(day)?;
    let environment = unit.habitat.get_environment();
    let raw_forage = unit.habitat.get_available_forage();

    // Marginally small forage counts as nothing.
    let mut available = raw_forage.mass()?;
    for ft in ForageType::ALL {
        if available.get(ft) < NEGLIGIBLE_FORAGE_MASS {
            available.set(ft, 0.0)?;
        }
    }
    let mut forage_today = raw_forage;
    forage_today.grass.mass = available.get(ForageType::Grass);
    let digestibility = raw_forage.digestibility()?;
    let nitrogen_content = raw_forage.nitrogen_content()?;

    if !do_herbivores {
        unit.current_output = CombinedData {
            habitat: HabitatData {
                available_forage: raw_forage,
                air_temperature: environment.air_temperature,
                ..HabitatData::default()
            },
            herbivores: BTreeMap::new(),
            datapoint_count: 1,
        };
        return Ok(());
    }

    if establish_as_needed {
        for population in &mut unit.populations {
            if population.is_empty() {
                population.establish()?;
            }
        }
        unit.set_initial_establishment_done();
    }

    // Daily events per cohort: expenditure, ageing, mortality; offspring
    // are collected per population and created after feeding.
    let mut offspring = vec![0.0; unit.populations.len()];
    for (population_index, population) in unit.populations.iter_mut().enumerate() {
        for cohort in population.cohorts_mut() {
            if !cohort.is_dead() {
                offspring[population_index] += cohort.simulate_day(day, &environment)?;
            }
        }
    }

    // Collect every living cohort's demand, then split the available
    // forage among them.
    let mut living: Vec<(usize, usize)> = Vec::new();
    let mut distribution: ForageDistribution = Vec::new();
    for (population_index, population) in unit.populations.iter_mut().enumerate() {
        for (cohort_index, cohort) in population.cohorts_mut().iter_mut().enumerate() {
            if !cohort.is_dead() {
                living.push((population_index, cohort_index));
                distribution.push(cohort.get_forage_demands(&forage_today)?);
            }
        }
    }
    distribute_forage.distribute(&available, &mut distribution)?;

    let mut eaten_total = ForageMass::zero();
    for ((population_index, cohort_index), portion) in living.iter().zip(&distribution) {
        if portion.sum() == 0.0 {
            continue;
        }
        let nitrogen = portion.scaled_by_fraction(&nitrogen_content);
        let cohort = &mut unit.populations[*population_index].cohorts_mut()[*cohort_index];
        cohort.eat(portion, &digestibility, &nitrogen)?;
        eaten_total = eaten_total.checked_add(portion)?;
    }
    if !(&eaten_total <= &available) {
        return Err(SimError::logic(
            "the distributed forage portions exceed the available forage",
        ));
    }
    unit.habitat.remove_eaten_forage(&eaten_total)?;

    for (population_index, population) in unit.populations.iter_mut().enumerate() {
        population.create_offspring(offspring[population_index])?;
    }

    // Record the herbivore output before the dead are purged, so that a
    // cohort's last day still counts.
    let mut herbivores = BTreeMap::new();
    for population in &unit.populations {
        let records: Vec<HerbivoreData> = population
            .cohorts()
            .iter()
            .map(|cohort| cohort.todays_output().clone())
            .collect();
        if !records.is_empty() {
            herbivores.insert(
                population.hft().name.clone(),
                HerbivoreData::combine(&records),
            );
        }
    }

    // Life-cycle bookkeeping: kill non-viable populations, harvest all
    // nitrogen (the dead return their body nitrogen too), then purge.
    let mut excreted_nitrogen = 0.0;
    for population in &mut unit.populations {
        population.kill_nonviable();
        for cohort in population.cohorts_mut() {
            excreted_nitrogen += cohort.take_nitrogen_excreta();
        }
        population.purge_of_dead();
    }
    unit.habitat.add_excreted_nitrogen(excreted_nitrogen);

    unit.current_output = CombinedData {
        habitat: HabitatData {
            available_forage: raw_forage,
            eaten_forage: eaten_total,
            excreted_nitrogen,
            air_temperature: environment.air_temperature,
        },
        herbivores,
        datapoint_count: 1,
    };
    Ok(())
}
