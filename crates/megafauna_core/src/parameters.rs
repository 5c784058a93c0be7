//! Global simulation parameters, loaded once from the instruction file.

use crate::error::{Result, SimError};
use megafauna_data::{ForageEnergyContent, ForageType, OutputInterval};
use serde::{Deserialize, Serialize};

/// Algorithm for distributing scarce forage among herbivores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForageDistributionAlgorithm {
    /// Proportional shares, no direct competition.
    Equally,
}

/// Which herbivore representation the simulation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HerbivoreType {
    /// Annual same-sex cohorts; state variables are means.
    Cohort,
}

/// Output sink format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Tab-separated text tables, one file per variable.
    TextTables,
}

/// Which text tables to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTable {
    AvailableForage,
    BodyFat,
    EatenForage,
    EatenNitrogen,
    Expenditure,
    IndividualDensity,
    MassDensity,
    Offspring,
}

/// Settings for the text-table writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextTableOptions {
    /// Directory the table files are created in.
    pub directory: String,
    /// Number of decimal places.
    pub precision: usize,
    /// The tables to write.
    pub tables: Vec<TextTable>,
}

impl Default for TextTableOptions {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            precision: 4,
            tables: vec![
                TextTable::AvailableForage,
                TextTable::BodyFat,
                TextTable::EatenForage,
                TextTable::IndividualDensity,
                TextTable::MassDensity,
            ],
        }
    }
}

/// Global, immutable simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub forage_distribution: ForageDistributionAlgorithm,
    pub herbivore_type: HerbivoreType,

    /// Interval [days] for re-establishing extinct populations; zero
    /// disables re-establishment.
    pub herbivore_establish_interval: u32,

    /// Gross (combustion) energy of forage dry matter [MJ/kgDM]. Not used
    /// by the default net-energy model, but part of a cohort's constant
    /// configuration: cohorts only merge if it matches.
    pub forage_gross_energy: ForageEnergyContent,

    pub output_format: OutputFormat,
    pub output_interval: OutputInterval,
    pub output_text_tables: TextTableOptions,
}

impl Default for Parameters {
    fn default() -> Self {
        let mut forage_gross_energy = ForageEnergyContent::zero();
        forage_gross_energy
            .set(ForageType::Grass, 19.0)
            .expect("static default is valid");
        Self {
            forage_distribution: ForageDistributionAlgorithm::Equally,
            herbivore_type: HerbivoreType::Cohort,
            herbivore_establish_interval: 365,
            forage_gross_energy,
            output_format: OutputFormat::TextTables,
            output_interval: OutputInterval::Annual,
            output_text_tables: TextTableOptions::default(),
        }
    }
}

impl Parameters {
    /// Validate the parameter set; called once when the world is built.
    pub fn validate(&self) -> Result<()> {
        if self.output_format == OutputFormat::TextTables
            && self.output_text_tables.directory.is_empty()
        {
            return Err(SimError::config(
                "output_text_tables.directory must not be empty",
            ));
        }
        for ft in ForageType::ALL {
            let gross_energy = self.forage_gross_energy.get(ft);
            if !(gross_energy.is_finite() && gross_energy >= 0.0) {
                return Err(SimError::config(format!(
                    "forage_gross_energy for {} must be a non-negative number",
                    ft.name()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let params = Parameters::default();
        let toml = toml::to_string(&params).unwrap();
        let parsed: Parameters = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_empty_output_directory_rejected() {
        let mut params = Parameters::default();
        params.output_text_tables.directory.clear();
        assert!(params.validate().is_err());
    }
}
