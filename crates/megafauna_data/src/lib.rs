//! Pure data structures for the megafauna simulation.
//!
//! This crate contains serializable parameter records, forage-value maps
//! and output datapoints shared between the simulation engine and the
//! output writers. It carries no simulation logic.

pub mod data;

pub use data::date::*;
pub use data::environment::*;
pub use data::forage::*;
pub use data::habitat_forage::*;
pub use data::hft::*;
pub use data::output::*;
