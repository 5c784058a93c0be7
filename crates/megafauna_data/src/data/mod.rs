pub mod date;
pub mod environment;
pub mod forage;
pub mod habitat_forage;
pub mod hft;
pub mod output;
