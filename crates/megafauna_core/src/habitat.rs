//! The interface the host vegetation model implements for each habitat.

use crate::error::Result;
use megafauna_data::{ForageMass, HabitatEnvironment, HabitatForage};

/// A spatial unit with vegetation, populated by herbivores.
///
/// The engine calls [`Habitat::init_day`] first in every day's stage
/// pipeline, reads forage and environment, and feeds eaten forage and
/// excreted nitrogen back. A habitat marked dead causes its simulation
/// unit to be dropped from the world.
pub trait Habitat: Send {
    /// Called first on each simulation day (0 = Jan 1st).
    fn init_day(&mut self, day_of_year: u16) -> Result<()>;

    /// Dry-matter forage currently available to herbivores.
    fn get_available_forage(&self) -> HabitatForage;

    /// Current abiotic conditions.
    fn get_environment(&self) -> HabitatEnvironment;

    /// Identifier grouping habitats for output averaging.
    fn get_aggregation_unit(&self) -> &str;

    /// Remove forage eaten by herbivores [kgDM/km²]. Must never be called
    /// with masses exceeding the available forage.
    fn remove_eaten_forage(&mut self, eaten_forage: &ForageMass) -> Result<()>;

    /// Return nitrogen [kgN/km²] to the biogeochemistry.
    fn add_excreted_nitrogen(&mut self, kg_per_km2: f64);

    /// Whether this habitat has been retired by the host model.
    fn is_dead(&self) -> bool;

    /// Retire the habitat; the world releases it before the next day.
    fn kill(&mut self);
}
