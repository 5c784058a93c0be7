//! Forage state of a habitat as reported by the host vegetation model.

use crate::data::forage::{
    Digestibility, ForageFraction, ForageMass, ForageType, ForageValueError,
};
use serde::{Deserialize, Serialize};

/// Grass forage in a habitat.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GrassForage {
    /// Dry-matter biomass available to herbivores [kgDM/km²].
    pub mass: f64,

    /// Fractional dry-matter digestibility (in-vitro, for ruminants).
    pub digestibility: f64,

    /// Foliar percentage cover: grass-covered fraction of the habitat.
    pub fpc: f64,

    /// Nitrogen content of the dry matter [kgN/kgDM].
    pub nitrogen_content: f64,
}

impl GrassForage {
    /// Dry-matter density within the grass-covered area [kgDM/km²].
    ///
    /// Always at least the whole-habitat mass; zero cover means zero
    /// sward density.
    #[must_use]
    pub fn sward_density(&self) -> f64 {
        if self.fpc == 0.0 {
            0.0
        } else {
            self.mass / self.fpc
        }
    }
}

/// All forage in a habitat.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HabitatForage {
    pub grass: GrassForage,
}

impl HabitatForage {
    /// Dry-matter mass per forage type [kgDM/km²].
    pub fn mass(&self) -> Result<ForageMass, ForageValueError> {
        let mut result = ForageMass::zero();
        result.set(ForageType::Grass, self.grass.mass)?;
        Ok(result)
    }

    /// Digestibility per forage type.
    pub fn digestibility(&self) -> Result<Digestibility, ForageValueError> {
        let mut result = Digestibility::zero();
        result.set(ForageType::Grass, self.grass.digestibility)?;
        Ok(result)
    }

    /// Nitrogen content per forage type [kgN/kgDM].
    pub fn nitrogen_content(&self) -> Result<ForageFraction, ForageValueError> {
        let mut result = ForageFraction::zero();
        result.set(ForageType::Grass, self.grass.nitrogen_content)?;
        Ok(result)
    }

    /// Weighted average of two habitat forage states, for output
    /// aggregation. Mass is averaged by the weights; digestibility is
    /// additionally weighted by mass so that massless data do not skew it.
    #[must_use]
    pub fn merge(&self, other: &Self, this_weight: f64, other_weight: f64) -> Self {
        let weight_sum = this_weight + other_weight;
        debug_assert!(weight_sum > 0.0);
        let mass_weight_self = self.grass.mass * this_weight;
        let mass_weight_other = other.grass.mass * other_weight;
        let mass_weight_sum = mass_weight_self + mass_weight_other;
        let digestibility = if mass_weight_sum > 0.0 {
            (self.grass.digestibility * mass_weight_self
                + other.grass.digestibility * mass_weight_other)
                / mass_weight_sum
        } else {
            (self.grass.digestibility * this_weight + other.grass.digestibility * other_weight)
                / weight_sum
        };
        Self {
            grass: GrassForage {
                mass: (self.grass.mass * this_weight + other.grass.mass * other_weight)
                    / weight_sum,
                digestibility,
                fpc: (self.grass.fpc * this_weight + other.grass.fpc * other_weight) / weight_sum,
                nitrogen_content: (self.grass.nitrogen_content * this_weight
                    + other.grass.nitrogen_content * other_weight)
                    / weight_sum,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sward_density() {
        let mut grass = GrassForage {
            mass: 100.0,
            digestibility: 0.5,
            fpc: 0.25,
            nitrogen_content: 0.02,
        };
        assert_eq!(grass.sward_density(), 400.0);
        grass.fpc = 0.0;
        assert_eq!(grass.sward_density(), 0.0);
    }

    #[test]
    fn test_merge_mass_weighted_digestibility() {
        let rich = HabitatForage {
            grass: GrassForage {
                mass: 100.0,
                digestibility: 0.8,
                fpc: 0.5,
                nitrogen_content: 0.02,
            },
        };
        let empty = HabitatForage {
            grass: GrassForage {
                mass: 0.0,
                digestibility: 0.1,
                fpc: 0.5,
                nitrogen_content: 0.02,
            },
        };
        let merged = rich.merge(&empty, 1.0, 1.0);
        assert_eq!(merged.grass.mass, 50.0);
        // Digestibility comes entirely from the mass-bearing side.
        assert!((merged.grass.digestibility - 0.8).abs() < 1e-12);
    }
}
