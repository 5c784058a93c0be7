//! A self-contained vegetation model for running the engine without a
//! host: logistic grass growth in a habitat with monthly climate cycles.

use megafauna_core::digestibility::{
    digestibility_from_npp, digestibility_pachzelt_2013, ATTRITION_PERIOD,
};
use megafauna_core::error::{Result, SimError};
use megafauna_core::habitat::Habitat;
use megafauna_data::{Date, ForageMass, ForageType, GrassForage, HabitatEnvironment, HabitatForage};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Days after which grown biomass no longer counts as live (green).
const LIVE_GRASS_AGE_DAYS: usize = 30;

/// How the demo grass derives its digestibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestibilityModel {
    /// Fixed values per month, recycled.
    PftFixed { monthly: Vec<f64> },
    /// Biomass-dependent live/dead mix after Pachzelt et al. (2013).
    #[serde(rename = "pachzelt_2013")]
    Pachzelt2013,
    /// Production-weighted average with linear senescence.
    FromNpp { fresh: f64, dead: f64 },
}

impl Default for DigestibilityModel {
    fn default() -> Self {
        Self::PftFixed { monthly: vec![0.5] }
    }
}

/// Settings for the logistic grass growth.
///
/// The monthly vectors are recycled when their end is reached; a vector
/// of length 12 repeats every year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrassSettings {
    /// Proportional daily growth rates, one per month.
    pub growth_monthly: Vec<f64>,
    /// Proportional daily decay rates, one per month.
    pub decay_monthly: Vec<f64>,
    pub digestibility: DigestibilityModel,
    /// Grass-covered fraction of the habitat.
    pub fpc: f64,
    /// Initial available forage [kgDM/km²].
    pub init_mass: f64,
    /// Ungrazable biomass reserve [kgDM/km²] from which growth restarts;
    /// Owen-Smith (2002) gives 20 g/m².
    pub reserve: f64,
    /// Saturation biomass [kgDM/km²]; Owen-Smith (2002) gives 200 g/m².
    pub saturation: f64,
    /// Nitrogen content of the dry matter [kgN/kgDM].
    pub nitrogen_content: f64,
}

impl Default for GrassSettings {
    fn default() -> Self {
        Self {
            growth_monthly: vec![0.0],
            decay_monthly: vec![0.0],
            digestibility: DigestibilityModel::default(),
            fpc: 0.1,
            init_mass: 0.0,
            reserve: 2.0e4,
            saturation: 2.0e5,
            nitrogen_content: 0.02,
        }
    }
}

impl GrassSettings {
    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.growth_monthly.is_empty() || self.decay_monthly.is_empty() {
            problems.push("growth and decay rates need at least one month".to_string());
        }
        if self.fpc <= 0.0 || self.fpc > 1.0 {
            problems.push("fpc must be in (0,1]".to_string());
        }
        if self.init_mass < 0.0 || self.reserve <= 0.0 || self.saturation <= 0.0 {
            problems.push("grass masses must be positive".to_string());
        }
        if self.init_mass > self.saturation {
            problems.push("init_mass must not exceed saturation".to_string());
        }
        if !(0.0..=1.0).contains(&self.nitrogen_content) {
            problems.push("nitrogen_content must be a fraction".to_string());
        }
        match &self.digestibility {
            DigestibilityModel::PftFixed { monthly } => {
                if monthly.is_empty() || monthly.iter().any(|d| !(0.0..=1.0).contains(d)) {
                    problems.push("monthly digestibility values must be fractions".to_string());
                }
            }
            DigestibilityModel::FromNpp { fresh, dead } => {
                if !(0.0..=1.0).contains(fresh) || !(0.0..=1.0).contains(dead) || dead > fresh {
                    problems.push("npp digestibility needs dead <= fresh, both fractions".to_string());
                }
            }
            DigestibilityModel::Pachzelt2013 => {}
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SimError::config(problems.join("; ")))
        }
    }
}

/// Grass growing logistically towards a saturation biomass, with an
/// ungrazable reserve so that it can recover from complete defoliation.
#[derive(Debug, Clone)]
pub struct LogisticGrass {
    settings: GrassSettings,
    mass: f64,
    digestibility: f64,
    /// Daily production record, today first; shrinks proportionally with
    /// biomass losses.
    production_record: VecDeque<f64>,
    simulation_month: usize,
    last_day: Option<u16>,
}

impl LogisticGrass {
    pub fn new(settings: GrassSettings) -> Result<Self> {
        settings.validate()?;
        let mut grass = Self {
            mass: settings.init_mass,
            digestibility: 0.0,
            production_record: VecDeque::new(),
            simulation_month: 0,
            last_day: None,
            settings,
        };
        if grass.mass > 0.0 {
            grass.production_record.push_back(grass.mass);
        }
        grass.digestibility = grass.current_digestibility()?;
        Ok(grass)
    }

    /// Grow and decay for one day.
    pub fn grow_daily(&mut self, day_of_year: u16) -> Result<()> {
        let date = Date::new(day_of_year, 0)?;
        if let Some(last) = self.last_day {
            if last != day_of_year && date.is_first_of_month() {
                self.simulation_month += 1;
            }
        }
        self.last_day = Some(day_of_year);

        let growth = recycled(&self.settings.growth_monthly, self.simulation_month);
        let decay = recycled(&self.settings.decay_monthly, self.simulation_month);

        // Logistic growth on the total standing biomass including the
        // ungrazable reserve; only the excess is available forage.
        let total = self.mass + self.settings.reserve;
        let grown = total * growth * (1.0 - total / self.settings.saturation);
        let decayed = total * decay;
        let new_total = (total + grown - decayed).max(0.0);
        let new_mass = (new_total - self.settings.reserve).max(0.0);

        self.production_record.push_front(grown.max(0.0));
        self.production_record.truncate(ATTRITION_PERIOD);
        self.set_mass(new_mass);

        self.digestibility = self.current_digestibility()?;
        Ok(())
    }

    /// Current forage state of the grass.
    #[must_use]
    pub fn forage(&self) -> GrassForage {
        GrassForage {
            mass: self.mass,
            digestibility: self.digestibility,
            fpc: self.settings.fpc,
            nitrogen_content: self.settings.nitrogen_content,
        }
    }

    /// Remove grazed biomass [kgDM/km²].
    pub fn remove_mass(&mut self, eaten: f64) -> Result<()> {
        if eaten > self.mass * 1.001 {
            return Err(SimError::logic(
                "eaten grass exceeds the available grass biomass",
            ));
        }
        self.set_mass((self.mass - eaten).max(0.0));
        Ok(())
    }

    /// Update the biomass and shrink the production record with it, so
    /// that losses remove old and young forage proportionally.
    fn set_mass(&mut self, new_mass: f64) {
        let record_sum: f64 = self.production_record.iter().sum();
        if record_sum > 0.0 {
            let factor = new_mass / record_sum;
            for entry in &mut self.production_record {
                *entry *= factor;
            }
        } else if new_mass > 0.0 {
            self.production_record.push_front(new_mass);
        }
        self.mass = new_mass;
    }

    fn current_digestibility(&self) -> Result<f64> {
        match &self.settings.digestibility {
            DigestibilityModel::PftFixed { monthly } => {
                Ok(recycled(monthly, self.simulation_month))
            }
            DigestibilityModel::Pachzelt2013 => {
                let live_mass: f64 = self
                    .production_record
                    .iter()
                    .take(LIVE_GRASS_AGE_DAYS)
                    .sum();
                let total: f64 = self.production_record.iter().sum();
                let phenology = if total > 0.0 { live_mass / total } else { 0.0 };
                let live_density_kg_m2 = live_mass / 1.0e6; // kg/km² → kg/m²
                digestibility_pachzelt_2013(live_density_kg_m2, phenology)
            }
            DigestibilityModel::FromNpp { fresh, dead } => {
                digestibility_from_npp(&self.production_record, *fresh, *dead)
            }
        }
    }
}

fn recycled(values: &[f64], month: usize) -> f64 {
    values[month % values.len()]
}

/// Settings for a [`DemoHabitat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HabitatSettings {
    pub grass: GrassSettings,
    /// Air temperature [°C] per month, recycled.
    pub air_temperature_monthly: Vec<f64>,
    /// Snow depth [cm] per month, recycled.
    pub snow_depth_monthly: Vec<f64>,
}

impl Default for HabitatSettings {
    fn default() -> Self {
        Self {
            grass: GrassSettings::default(),
            air_temperature_monthly: vec![10.0],
            snow_depth_monthly: vec![0.0],
        }
    }
}

/// A habitat driven entirely by its settings, independent of any host
/// vegetation model.
pub struct DemoHabitat {
    grass: LogisticGrass,
    settings: HabitatSettings,
    aggregation_unit: String,
    simulation_month: usize,
    last_day: Option<u16>,
    soil_nitrogen: f64,
    dead: bool,
}

impl DemoHabitat {
    pub fn new(settings: HabitatSettings, aggregation_unit: String) -> Result<Self> {
        if settings.air_temperature_monthly.is_empty() || settings.snow_depth_monthly.is_empty() {
            return Err(SimError::config(
                "air temperature and snow depth need at least one monthly value",
            ));
        }
        Ok(Self {
            grass: LogisticGrass::new(settings.grass.clone())?,
            settings,
            aggregation_unit,
            simulation_month: 0,
            last_day: None,
            soil_nitrogen: 0.0,
            dead: false,
        })
    }

    /// Nitrogen returned by the herbivores so far [kgN/km²].
    #[must_use]
    pub fn soil_nitrogen(&self) -> f64 {
        self.soil_nitrogen
    }
}

impl Habitat for DemoHabitat {
    fn init_day(&mut self, day_of_year: u16) -> Result<()> {
        let date = Date::new(day_of_year, 0)?;
        if let Some(last) = self.last_day {
            if last != day_of_year && date.is_first_of_month() {
                self.simulation_month += 1;
            }
        }
        self.last_day = Some(day_of_year);
        self.grass.grow_daily(day_of_year)
    }

    fn get_available_forage(&self) -> HabitatForage {
        HabitatForage {
            grass: self.grass.forage(),
        }
    }

    fn get_environment(&self) -> HabitatEnvironment {
        HabitatEnvironment {
            air_temperature: recycled(
                &self.settings.air_temperature_monthly,
                self.simulation_month,
            ),
            snow_depth: recycled(&self.settings.snow_depth_monthly, self.simulation_month),
        }
    }

    fn get_aggregation_unit(&self) -> &str {
        &self.aggregation_unit
    }

    fn remove_eaten_forage(&mut self, eaten_forage: &ForageMass) -> Result<()> {
        self.grass.remove_mass(eaten_forage.get(ForageType::Grass))
    }

    fn add_excreted_nitrogen(&mut self, kg_per_km2: f64) {
        self.soil_nitrogen += kg_per_km2;
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn kill(&mut self) {
        self.dead = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn growing_settings() -> GrassSettings {
        GrassSettings {
            growth_monthly: vec![0.05],
            decay_monthly: vec![0.01],
            init_mass: 1.0e4,
            ..GrassSettings::default()
        }
    }

    #[test]
    fn test_settings_validation() {
        assert!(GrassSettings::default().validate().is_ok());
        assert!(GrassSettings {
            fpc: 0.0,
            ..GrassSettings::default()
        }
        .validate()
        .is_err());
        assert!(GrassSettings {
            init_mass: 1.0e9,
            ..GrassSettings::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_grass_grows_towards_saturation() {
        let settings = growing_settings();
        let saturation = settings.saturation;
        let mut grass = LogisticGrass::new(settings).unwrap();
        let mut last_mass = grass.forage().mass;
        let mut date = Date::new(0, 0).unwrap();
        for _ in 0..(5 * 365) {
            grass.grow_daily(date.julian_day().min(364)).unwrap();
            date = date.next();
        }
        let final_mass = grass.forage().mass;
        assert!(final_mass > last_mass);
        assert!(final_mass < saturation);
        // Near equilibrium now: one more day changes little.
        last_mass = final_mass;
        grass.grow_daily(0).unwrap();
        assert!((grass.forage().mass - last_mass).abs() / last_mass < 0.01);
    }

    #[test]
    fn test_grass_recovers_from_total_grazing() {
        let mut grass = LogisticGrass::new(growing_settings()).unwrap();
        grass.grow_daily(0).unwrap();
        let mass = grass.forage().mass;
        grass.remove_mass(mass).unwrap();
        assert_eq!(grass.forage().mass, 0.0);
        for day in 1..100 {
            grass.grow_daily(day.min(364)).unwrap();
        }
        assert!(grass.forage().mass > 0.0);
    }

    #[test]
    fn test_overgrazing_rejected() {
        let mut grass = LogisticGrass::new(growing_settings()).unwrap();
        grass.grow_daily(0).unwrap();
        let mass = grass.forage().mass;
        assert!(grass.remove_mass(mass * 1.1).is_err());
    }

    #[test]
    fn test_monthly_cycles_recycle() {
        let settings = HabitatSettings {
            air_temperature_monthly: vec![-10.0, 20.0],
            ..HabitatSettings::default()
        };
        let mut habitat = DemoHabitat::new(settings, "unit".to_string()).unwrap();
        habitat.init_day(0).unwrap();
        assert_eq!(habitat.get_environment().air_temperature, -10.0);
        // Through February (month 1) the second value applies...
        for day in 1..=31 {
            habitat.init_day(day).unwrap();
        }
        assert_eq!(habitat.get_environment().air_temperature, 20.0);
        // ...and March wraps around to the first again.
        for day in 32..=59 {
            habitat.init_day(day).unwrap();
        }
        assert_eq!(habitat.get_environment().air_temperature, -10.0);
    }

    #[test]
    fn test_npp_digestibility_declines_without_growth() {
        let settings = GrassSettings {
            growth_monthly: vec![0.0],
            decay_monthly: vec![0.0],
            init_mass: 1.0e4,
            digestibility: DigestibilityModel::FromNpp {
                fresh: 0.7,
                dead: 0.4,
            },
            ..GrassSettings::default()
        };
        let mut grass = LogisticGrass::new(settings).unwrap();
        grass.grow_daily(0).unwrap();
        let fresh = grass.forage().digestibility;
        for day in 1..200 {
            grass.grow_daily(day).unwrap();
        }
        let aged = grass.forage().digestibility;
        assert!(aged < fresh);
        assert!(aged >= 0.4);
    }

    #[test]
    fn test_pachzelt_digestibility_within_bounds() {
        let settings = GrassSettings {
            digestibility: DigestibilityModel::Pachzelt2013,
            ..growing_settings()
        };
        let mut grass = LogisticGrass::new(settings).unwrap();
        for day in 0..365 {
            grass.grow_daily(day.min(364)).unwrap();
            let digestibility = grass.forage().digestibility;
            assert!((0.0..=1.0).contains(&digestibility));
        }
    }
}
