//! The TOML instruction file of the standalone simulator.

use crate::demo::HabitatSettings;
use megafauna_core::parameters::Parameters;
use megafauna_data::Hft;
use serde::{Deserialize, Serialize};

/// Settings of the simulation run itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Number of years to simulate.
    pub years: u32,
    /// Number of habitat groups (aggregation units).
    pub habitat_groups: u32,
    /// Number of habitats per group.
    pub habitats_per_group: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            years: 10,
            habitat_groups: 1,
            habitats_per_group: 1,
        }
    }
}

/// Everything the standalone simulator reads from one instruction file:
/// run settings, global parameters, the herbivore functional types and
/// the demo habitat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstructionFile {
    pub simulation: SimulationSettings,
    pub parameters: Parameters,
    #[serde(rename = "hft")]
    pub hfts: Vec<Hft>,
    pub habitat: HabitatSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_instruction_file() {
        let toml = r#"
            [simulation]
            years = 2

            [[hft]]
            name = "horse"
            digestion_type = "hindgut"

            [habitat.grass]
            growth_monthly = [0.05]
            decay_monthly = [0.01]
        "#;
        let parsed: InstructionFile = toml::from_str(toml).unwrap();
        assert_eq!(parsed.simulation.years, 2);
        assert_eq!(parsed.hfts.len(), 1);
        assert_eq!(parsed.hfts[0].name, "horse");
        assert_eq!(parsed.habitat.grass.growth_monthly, vec![0.05]);
        // Unset sections fall back to defaults.
        assert_eq!(parsed.simulation.habitat_groups, 1);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let toml = r#"
            [simulation]
            yaers = 2
        "#;
        assert!(toml::from_str::<InstructionFile>(toml).is_err());
    }
}
