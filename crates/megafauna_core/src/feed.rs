//! Distribution of available forage among competing herbivores.

use crate::error::Result;
use crate::parameters::ForageDistributionAlgorithm;
use megafauna_data::{ForageMass, ForageType};

/// One row of the forage distribution: a herbivore's demand on input,
/// its granted portion on output [kgDM/km²].
pub type ForageDistribution = Vec<ForageMass>;

/// Safety margin against floating-point overshoot: under scarcity only
/// this share of the available forage is handed out.
const DISTRIBUTION_MARGIN: f64 = 0.999;

/// Strategy for splitting the habitat's forage across herbivores.
///
/// Implementations turn the demands in `distribution` into portions,
/// in place. The portion sum must never exceed the available forage, and
/// no herbivore may receive more than it demanded.
pub trait DistributeForage: Send + Sync {
    fn distribute(&self, available: &ForageMass, distribution: &mut ForageDistribution)
        -> Result<()>;
}

/// Equal distribution without direct competition: under scarcity each
/// herbivore receives its proportional share `demand / Σ demand ·
/// available`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributeForageEqually;

impl DistributeForage for DistributeForageEqually {
    fn distribute(
        &self,
        available: &ForageMass,
        distribution: &mut ForageDistribution,
    ) -> Result<()> {
        for ft in ForageType::ALL {
            let total_demand: f64 = distribution.iter().map(|demand| demand.get(ft)).sum();
            let available_mass = available.get(ft);
            if total_demand <= available_mass || total_demand == 0.0 {
                continue; // everyone gets what they asked for
            }
            let ratio = available_mass * DISTRIBUTION_MARGIN / total_demand;
            for portion in distribution.iter_mut() {
                portion.set(ft, portion.get(ft) * ratio)?;
            }
        }
        Ok(())
    }
}

/// Construct the distribution strategy selected in the parameters.
#[must_use]
pub fn create_distribute_forage(
    algorithm: ForageDistributionAlgorithm,
) -> Box<dyn DistributeForage> {
    match algorithm {
        ForageDistributionAlgorithm::Equally => Box::new(DistributeForageEqually),
    }
}
