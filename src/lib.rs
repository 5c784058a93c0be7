//! Megafauna: a simulation library for large-herbivore population
//! dynamics.
//!
//! A host vegetation model supplies habitats (the
//! [`megafauna_core::habitat::Habitat`] trait); the engine evolves
//! herbivore cohorts day by day and feeds eaten forage and excreted
//! nitrogen back. This crate bundles the engine, the output writers and
//! a standalone demo vegetation model behind one facade.

pub mod demo;
pub mod instruction;

pub use megafauna_core as core;
pub use megafauna_data as data;
pub use megafauna_io as io;

pub use megafauna_core::{HftList, Result, SimDayOptions, SimError, World};

use megafauna_core::parameters::Parameters;
use megafauna_data::Hft;

/// Build a [`World`] with the output writer selected in the parameters.
pub fn build_world(params: Parameters, hfts: Vec<Hft>) -> Result<World> {
    let hft_names = hfts.iter().map(|hft| hft.name.clone()).collect();
    let writer = megafauna_io::create_output_writer(&params, hft_names)?;
    World::new(params, hfts, writer)
}
