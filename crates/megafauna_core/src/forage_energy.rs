//! Net energy content of forage.

use crate::error::Result;
use megafauna_data::{
    Digestibility, DigestionType, ForageEnergyContent, ForageType, NetEnergyModel,
};

/// Metabolizable energy coefficient of grass [MJ/kgDM]: ME = 15·DOMD,
/// after MAFF et al. (1984), cited in Givens et al. (1989).
pub const ME_COEFFICIENT_GRASS: f64 = 15.0;

/// Digestion efficiency of hindgut fermenters relative to ruminants,
/// after Illius & Gordon (1992).
pub const DIGESTION_EFFICIENCY_HINDGUTS: f64 = 0.93;

/// Get the net energy content of forage [MJ/kgDM] from its digestibility.
///
/// The default model multiplies metabolizable energy `ME = 15·d` with the
/// maintenance efficiency term of Illius & Gordon (1992, p. 148), citing
/// ARC (1980): `NE = ME·(0.503 + 0.019·ME)`, scaled by 0.93 for hindgut
/// fermenters.
pub fn net_energy_content(
    digestibility: &Digestibility,
    model: NetEnergyModel,
    digestion_type: DigestionType,
) -> Result<ForageEnergyContent> {
    match model {
        NetEnergyModel::Default => {
            let efficiency = match digestion_type {
                DigestionType::Ruminant => 1.0,
                DigestionType::Hindgut => DIGESTION_EFFICIENCY_HINDGUTS,
            };
            let mut result = ForageEnergyContent::zero();
            for ft in ForageType::ALL {
                let me = match ft {
                    ForageType::Grass => ME_COEFFICIENT_GRASS * digestibility.get(ft),
                };
                let ne = me * (0.503 + 0.019 * me) * efficiency;
                result.set(ft, ne)?;
            }
            Ok(result)
        }
    }
}
