//! Shared fixtures for the integration tests.

use megafauna::core::error::{Result, SimError};
use megafauna::core::habitat::Habitat;
use megafauna_data::{
    ForageMass, ForageType, GrassForage, HabitatEnvironment, HabitatForage, Hft,
};

/// A habitat with an unchanging forage supply: whatever is eaten has
/// regrown by the next morning. Records the fluxes for assertions.
pub struct ConstantHabitat {
    forage: HabitatForage,
    aggregation_unit: String,
    pub eaten_total: f64,
    pub excreted_nitrogen_total: f64,
    dead: bool,
}

impl ConstantHabitat {
    pub fn new(grass_mass: f64, digestibility: f64) -> Self {
        Self {
            forage: HabitatForage {
                grass: GrassForage {
                    mass: grass_mass,
                    digestibility,
                    fpc: 0.5,
                    nitrogen_content: 0.02,
                },
            },
            aggregation_unit: "test".to_string(),
            eaten_total: 0.0,
            excreted_nitrogen_total: 0.0,
            dead: false,
        }
    }
}

impl Habitat for ConstantHabitat {
    fn init_day(&mut self, _day_of_year: u16) -> Result<()> {
        Ok(())
    }

    fn get_available_forage(&self) -> HabitatForage {
        self.forage
    }

    fn get_environment(&self) -> HabitatEnvironment {
        HabitatEnvironment::default()
    }

    fn get_aggregation_unit(&self) -> &str {
        &self.aggregation_unit
    }

    fn remove_eaten_forage(&mut self, eaten_forage: &ForageMass) -> Result<()> {
        let eaten = eaten_forage.get(ForageType::Grass);
        if eaten > self.forage.grass.mass {
            return Err(SimError::logic("eaten forage exceeds available forage"));
        }
        self.eaten_total += eaten;
        Ok(())
    }

    fn add_excreted_nitrogen(&mut self, kg_per_km2: f64) {
        self.excreted_nitrogen_total += kg_per_km2;
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn kill(&mut self) {
        self.dead = true;
    }
}

/// The herbivore of the end-to-end scenarios: a 100-kg grazer with no
/// mortality, reproducing at a constant maximum rate in a 90-day season.
pub fn scenario_hft() -> Hft {
    Hft {
        name: "grazer".to_string(),
        body_mass_male: 100.0,
        body_mass_female: 100.0,
        body_mass_birth: 5.0,
        body_fat_maximum: 0.25,
        breeding_season_start: 100,
        breeding_season_length: 90,
        establishment_age_range: (2, 2),
        establishment_density: 10.0,
        life_history_sexual_maturity: 1,
        mortality_factors: vec![],
        foraging_limits: vec![],
        reproduction_model: megafauna_data::ReproductionModel::ConstMax,
        reproduction_annual_maximum: 1.0,
        ..Hft::default()
    }
}
