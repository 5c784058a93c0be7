//! Central management of all habitats and herbivore populations.

use crate::error::{Result, SimError};
use crate::feed::{create_distribute_forage, DistributeForage};
use crate::habitat::Habitat;
use crate::output::{Aggregator, OutputWriter};
use crate::parameters::Parameters;
use crate::population::CohortPopulation;
use crate::simulate_day::simulate_day;
use crate::simulation_unit::SimulationUnit;
use megafauna_data::{Date, Hft};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// The immutable list of herbivore functional types, shared read-only
/// across the whole simulation.
pub type HftList = Vec<Arc<Hft>>;

/// Options for [`World::simulate_day`].
#[derive(Debug, Clone, Copy)]
pub struct SimDayOptions {
    /// Whether to simulate the herbivores; if false, only the habitats'
    /// output data are updated.
    pub do_herbivores: bool,

    /// Accept a non-consecutive date, e.g. when restarting the simulation
    /// time for another area. Clear the old simulation units first by
    /// killing their habitats.
    pub reset_date: bool,
}

impl Default for SimDayOptions {
    fn default() -> Self {
        Self {
            do_herbivores: true,
            reset_date: false,
        }
    }
}

/// Owner of all simulation units; iterates them day by day and emits
/// aggregated output.
pub struct World {
    params: Arc<Parameters>,
    hfts: HftList,
    sim_units: Vec<SimulationUnit>,
    distribute_forage: Box<dyn DistributeForage>,
    days_since_last_establishment: u32,
    last_date: Option<Date>,
    aggregator: Aggregator,
    writer: Box<dyn OutputWriter>,
}

impl World {
    /// Build a world from validated parameters and functional types. The
    /// output writer is injected by the caller; construction fails on any
    /// configuration error.
    pub fn new(params: Parameters, hfts: Vec<Hft>, writer: Box<dyn OutputWriter>) -> Result<Self> {
        params.validate()?;
        let mut messages = Vec::new();
        let mut names = HashSet::new();
        for hft in &hfts {
            messages.extend(hft.find_invalid_parameters());
            if !names.insert(hft.name.clone()) {
                messages.push(format!("duplicate HFT name \"{}\"", hft.name));
            }
        }
        if !messages.is_empty() {
            return Err(SimError::config(messages.join("; ")));
        }
        let distribute_forage = create_distribute_forage(params.forage_distribution);
        info!(
            hft_count = hfts.len(),
            output_interval = ?params.output_interval,
            "megafauna world created"
        );
        Ok(Self {
            // Let the establishment check fire on the very first day.
            days_since_last_establishment: params.herbivore_establish_interval,
            params: Arc::new(params),
            hfts: hfts.into_iter().map(Arc::new).collect(),
            sim_units: Vec::new(),
            distribute_forage,
            last_date: None,
            aggregator: Aggregator::new(),
            writer,
        })
    }

    /// Global simulation parameters.
    #[must_use]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// The immutable list of herbivore functional types.
    #[must_use]
    pub fn hfts(&self) -> &[Arc<Hft>] {
        &self.hfts
    }

    /// Read access to the simulation units.
    #[must_use]
    pub fn sim_units(&self) -> &[SimulationUnit] {
        &self.sim_units
    }

    /// Compose a new simulation unit from an externally supplied habitat,
    /// with one fresh population per functional type. The world owns the
    /// unit until the habitat is marked dead.
    pub fn create_simulation_unit(&mut self, habitat: Box<dyn Habitat>) {
        let populations = self
            .hfts
            .iter()
            .map(|hft| CohortPopulation::new(Arc::clone(hft), self.params.forage_gross_energy))
            .collect();
        debug!(
            aggregation_unit = habitat.get_aggregation_unit(),
            "new simulation unit"
        );
        self.sim_units.push(SimulationUnit::new(habitat, populations));
    }

    /// Simulate one day in every simulation unit and aggregate the
    /// output.
    ///
    /// The date must be the immediate successor of the previous call's
    /// date unless [`SimDayOptions::reset_date`] is set. Units whose
    /// habitat has been marked dead are released before simulating.
    pub fn simulate_day(&mut self, date: Date, options: &SimDayOptions) -> Result<()> {
        if let Some(last) = &self.last_date {
            if !options.reset_date && !last.is_successive(&date) {
                return Err(SimError::invalid(format!(
                    "simulation days must be consecutive: day {} of year {} does not follow \
                     day {} of year {}",
                    date.julian_day(),
                    date.year(),
                    last.julian_day(),
                    last.year()
                )));
            }
        }
        self.last_date = Some(date);

        self.sim_units.retain(|unit| !unit.habitat().is_dead());

        // Every establishment interval, extinct populations get another
        // chance; an interval of zero disables re-establishment.
        let interval = self.params.herbivore_establish_interval;
        let establishment_due = interval > 0 && self.days_since_last_establishment >= interval;
        if establishment_due {
            self.days_since_last_establishment = 0;
        }
        if options.do_herbivores {
            self.days_since_last_establishment += 1;
        }

        // Simulation units are independent within one day; only the
        // output aggregation below is sequential.
        let day = date.julian_day().min(364);
        let distribute_forage = self.distribute_forage.as_ref();
        let do_herbivores = options.do_herbivores;
        let daily_output: Vec<(String, megafauna_data::CombinedData)> = self
            .sim_units
            .par_iter_mut()
            .map(|unit| {
                let establish_as_needed =
                    establishment_due || !unit.is_initial_establishment_done();
                simulate_day(
                    day,
                    unit,
                    distribute_forage,
                    do_herbivores,
                    establish_as_needed,
                )?;
                Ok((
                    unit.habitat().get_aggregation_unit().to_string(),
                    unit.current_output().clone(),
                ))
            })
            .collect::<Result<_>>()?;

        for (aggregation_unit, data) in daily_output {
            self.aggregator.add(date, &aggregation_unit, data);
        }

        if self.aggregator.has_data()
            && self
                .aggregator
                .interval()?
                .matches_output_interval(self.params.output_interval)
        {
            for datapoint in self.aggregator.retrieve() {
                self.writer.write_datapoint(&datapoint)?;
            }
        }
        Ok(())
    }
}
