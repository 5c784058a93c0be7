//! # Megafauna Core
//!
//! The simulation engine for large-herbivore population dynamics: given a
//! host vegetation model that supplies habitats, herbivore cohorts are
//! evolved day by day through an energy budget with fat reserves,
//! digestive and foraging intake limits, seasonal reproduction and
//! several mortality factors. Eaten forage and excreted nitrogen flow
//! back to the host.
//!
//! The [`world::World`] façade owns all simulation units (habitat +
//! populations) and is the central entry point:
//!
//! ```ignore
//! let mut world = World::new(params, hfts, writer)?;
//! world.create_simulation_unit(habitat);
//! world.simulate_day(date, &SimDayOptions::default())?;
//! ```
//!
//! All plug-in behavior (intake limits, net energy, expenditure,
//! reproduction, mortality, diet) is selected by tags on the herbivore
//! functional type; the habitat side is the [`habitat::Habitat`] trait.

/// Daily forage demand calculation per herbivore.
pub mod demand;
/// Digestibility models for host vegetation.
pub mod digestibility;
/// Fat reserves, anabolism and catabolism.
pub mod energy_budget;
/// Engine error types.
pub mod error;
/// Daily energy expenditure components.
pub mod expenditure;
/// Distribution of scarce forage among herbivores.
pub mod feed;
/// Conversion from digestibility to net energy.
pub mod forage_energy;
/// Intake limit models.
pub mod foraging_limits;
/// The habitat interface of the host model.
pub mod habitat;
/// Herbivore cohorts and their per-day update.
pub mod herbivore;
/// Mortality factors.
pub mod mortality;
/// Output aggregation and the writer interface.
pub mod output;
/// Global simulation parameters.
pub mod parameters;
/// Cohort containers per functional type.
pub mod population;
/// Reproduction models and the breeding season.
pub mod reproduction;
/// The one-day stage pipeline for a simulation unit.
pub mod simulate_day;
/// Habitat + populations.
pub mod simulation_unit;
/// The world façade.
pub mod world;

pub use error::{Result, SimError};
pub use world::{HftList, SimDayOptions, World};
