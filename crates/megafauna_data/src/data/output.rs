//! Per-day output records and their aggregation arithmetic.

use crate::data::date::DateInterval;
use crate::data::forage::{ForageEnergy, ForageMass};
use crate::data::habitat_forage::HabitatForage;
use crate::data::hft::MortalityFactor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn average(a: f64, b: f64, weight_a: f64, weight_b: f64) -> f64 {
    if weight_a + weight_b > 0.0 {
        (a * weight_a + b * weight_b) / (weight_a + weight_b)
    } else {
        0.0
    }
}

/// Daily output of the herbivores of one functional type.
///
/// Density values are sums over the cohorts; everything else is a
/// density-weighted mean per individual.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HerbivoreData {
    /// Mean age [years].
    pub age_years: f64,
    /// Mean fractional body fat in the empty body.
    pub body_fat: f64,
    /// Individual density [ind/km²].
    pub ind_per_km2: f64,
    /// Mass density [kg/km²].
    pub kg_per_km2: f64,
    /// Energy expenditure [MJ/ind/day].
    pub expenditure: f64,
    /// Offspring born today [ind/km²].
    pub offspring: f64,
    /// Daily mortality per enabled factor.
    pub mortality: BTreeMap<MortalityFactor, f64>,
    /// Eaten forage [kgDM/ind/day].
    pub eaten_forage_per_ind: ForageMass,
    /// Net energy intake [MJ/ind/day].
    pub energy_intake_per_ind: ForageEnergy,
    /// Ingested nitrogen [kgN/km²/day].
    pub eaten_nitrogen_per_km2: f64,
}

impl HerbivoreData {
    /// Combine the records of several cohorts of the same functional type
    /// into one, for a single day.
    #[must_use]
    pub fn combine(cohorts: &[HerbivoreData]) -> HerbivoreData {
        let mut result = HerbivoreData::default();
        for data in cohorts {
            result.merge_weighted(data, data.ind_per_km2);
        }
        result
    }

    /// Merge another same-day record into this one, weighting per-individual
    /// values by the given density weight.
    fn merge_weighted(&mut self, other: &HerbivoreData, weight: f64) {
        let own_weight = self.ind_per_km2;
        if own_weight + weight > 0.0 {
            self.age_years = average(self.age_years, other.age_years, own_weight, weight);
            self.body_fat = average(self.body_fat, other.body_fat, own_weight, weight);
            self.expenditure = average(self.expenditure, other.expenditure, own_weight, weight);
            self.eaten_forage_per_ind = self
                .eaten_forage_per_ind
                .merge(&other.eaten_forage_per_ind, own_weight, weight)
                .unwrap_or_default();
            self.energy_intake_per_ind = self
                .energy_intake_per_ind
                .merge(&other.energy_intake_per_ind, own_weight, weight)
                .unwrap_or_default();
            let mut mortality = BTreeMap::new();
            for (factor, rate) in &self.mortality {
                let other_rate = other.mortality.get(factor).copied().unwrap_or(0.0);
                mortality.insert(*factor, average(*rate, other_rate, own_weight, weight));
            }
            for (factor, rate) in &other.mortality {
                mortality
                    .entry(*factor)
                    .or_insert_with(|| average(0.0, *rate, own_weight, weight));
            }
            self.mortality = mortality;
        }
        self.ind_per_km2 += other.ind_per_km2;
        self.kg_per_km2 += other.kg_per_km2;
        self.offspring += other.offspring;
        self.eaten_nitrogen_per_km2 += other.eaten_nitrogen_per_km2;
    }

    /// Merge a record from another day or habitat, weighted by datapoint
    /// counts.
    pub fn merge_across_time(&mut self, other: &HerbivoreData, this_count: u32, other_count: u32) {
        let (w1, w2) = (this_count as f64, other_count as f64);
        self.age_years = average(self.age_years, other.age_years, w1, w2);
        self.body_fat = average(self.body_fat, other.body_fat, w1, w2);
        self.ind_per_km2 = average(self.ind_per_km2, other.ind_per_km2, w1, w2);
        self.kg_per_km2 = average(self.kg_per_km2, other.kg_per_km2, w1, w2);
        self.expenditure = average(self.expenditure, other.expenditure, w1, w2);
        // Offspring and nitrogen are accumulated over the interval.
        self.offspring += other.offspring;
        self.eaten_nitrogen_per_km2 += other.eaten_nitrogen_per_km2;
        self.eaten_forage_per_ind = self
            .eaten_forage_per_ind
            .merge(&other.eaten_forage_per_ind, w1, w2)
            .unwrap_or_default();
        self.energy_intake_per_ind = self
            .energy_intake_per_ind
            .merge(&other.energy_intake_per_ind, w1, w2)
            .unwrap_or_default();
        // Only mortality factors present in both records stay meaningful.
        let mut mortality = BTreeMap::new();
        for (factor, rate) in &self.mortality {
            if let Some(other_rate) = other.mortality.get(factor) {
                mortality.insert(*factor, average(*rate, *other_rate, w1, w2));
            }
        }
        self.mortality = mortality;
    }
}

/// Daily output of one habitat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HabitatData {
    /// Forage available at the start of the day.
    pub available_forage: HabitatForage,
    /// Forage eaten over the day [kgDM/km²].
    pub eaten_forage: ForageMass,
    /// Nitrogen returned to the habitat today [kgN/km²].
    pub excreted_nitrogen: f64,
    /// Air temperature [°C].
    pub air_temperature: f64,
}

impl HabitatData {
    fn merge(&mut self, other: &HabitatData, this_count: u32, other_count: u32) {
        let (w1, w2) = (this_count as f64, other_count as f64);
        self.available_forage = self.available_forage.merge(&other.available_forage, w1, w2);
        self.air_temperature = average(self.air_temperature, other.air_temperature, w1, w2);
        // Fluxes accumulate over the aggregation interval.
        self.eaten_forage = self
            .eaten_forage
            .checked_add(&other.eaten_forage)
            .unwrap_or_default();
        self.excreted_nitrogen += other.excreted_nitrogen;
    }
}

/// Output of one simulation unit for one day, or an aggregate of many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedData {
    pub habitat: HabitatData,
    /// Herbivore output keyed by HFT name.
    pub herbivores: BTreeMap<String, HerbivoreData>,
    /// Number of merged daily records.
    pub datapoint_count: u32,
}

impl Default for CombinedData {
    fn default() -> Self {
        Self {
            habitat: HabitatData::default(),
            herbivores: BTreeMap::new(),
            datapoint_count: 1,
        }
    }
}

impl CombinedData {
    /// Merge another record in, building weighted averages.
    pub fn merge(&mut self, other: &CombinedData) {
        self.habitat
            .merge(&other.habitat, self.datapoint_count, other.datapoint_count);
        for (hft_name, other_data) in &other.herbivores {
            match self.herbivores.get_mut(hft_name) {
                Some(own) => {
                    own.merge_across_time(other_data, self.datapoint_count, other.datapoint_count);
                }
                None => {
                    // An HFT that appears mid-interval averages against
                    // zero-density records for the days it was missing.
                    let mut own = HerbivoreData::default();
                    own.merge_across_time(other_data, self.datapoint_count, other.datapoint_count);
                    self.herbivores.insert(hft_name.clone(), own);
                }
            }
        }
        self.datapoint_count += other.datapoint_count;
    }
}

/// Aggregated output for one aggregation unit over one date interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub aggregation_unit: String,
    pub interval: DateInterval,
    pub data: CombinedData,
}
