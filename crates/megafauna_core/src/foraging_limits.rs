//! Models restricting the daily forage intake of herbivores.

use crate::error::{Result, SimError};
use megafauna_data::GivenPointAllometry;

/// Evaluate an allometric relation `y = c·Mᵉ` whose coefficient is fitted
/// so that the curve passes through the given value at male adult body
/// mass.
pub fn calc_allometry(
    allometry: &GivenPointAllometry,
    bodymass_male_adult: f64,
    bodymass: f64,
) -> Result<f64> {
    if bodymass <= 0.0 {
        return Err(SimError::invalid("body mass must be positive"));
    }
    if bodymass_male_adult <= 0.0 {
        return Err(SimError::invalid("male adult body mass must be positive"));
    }
    if allometry.exponent <= 0.0 {
        return Err(SimError::invalid("allometric exponent must be positive"));
    }
    let coefficient = allometry.value_male_adult * bodymass_male_adult.powf(-allometry.exponent);
    Ok(coefficient * bodymass.powf(allometry.exponent))
}

/// Digestion-limited daily grass energy intake [MJ/ind/day] after Illius &
/// Gordon (1992).
///
/// `I = i·e^(j·d)·M_ad^(k·e^d + 0.73)·(M/M_ad)^0.75` with proportional
/// digestibility d, adult mass M_ad and current mass M. The last factor
/// scales gut capacity for growing animals (Illius & Gordon 1999). The
/// parameters i, j, k come from the regression of Shipley et al. (1999)
/// and are specific to ruminants and hindgut fermenters.
///
/// Zero digestibility yields zero intake.
pub fn digestive_limit_illius_gordon_1992(
    bodymass_adult: f64,
    bodymass: f64,
    digestibility: f64,
    ijk: &[f64; 3],
) -> Result<f64> {
    if bodymass_adult <= 0.0 {
        return Err(SimError::invalid("adult body mass must be positive"));
    }
    if bodymass <= 0.0 {
        return Err(SimError::invalid("body mass must be positive"));
    }
    if bodymass > bodymass_adult {
        return Err(SimError::logic(
            "current body mass exceeds the adult body mass",
        ));
    }
    if digestibility == 0.0 {
        return Ok(0.0);
    }
    let [i, j, k] = *ijk;
    let d = digestibility;
    let gut_capacity = (bodymass / bodymass_adult).powf(0.75);
    Ok(i * (j * d).exp() * bodymass_adult.powf(k * d.exp() + 0.73) * gut_capacity)
}

/// Holling type II functional response: intake saturates hyperbolically
/// with forage density.
///
/// `I = I_max · V / (V_½ + V)` where V is forage density and V_½ the
/// half-saturation density at which half of the maximum intake rate is
/// reached. Units of density and intake are up to the caller, as long as
/// they are used consistently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfMaxIntake {
    half_max_density: f64,
    max_intake: f64,
}

impl HalfMaxIntake {
    pub fn new(half_max_density: f64, max_intake: f64) -> Result<Self> {
        if half_max_density <= 0.0 {
            return Err(SimError::invalid(
                "half-saturation density must be positive",
            ));
        }
        if max_intake <= 0.0 {
            return Err(SimError::invalid("maximum intake must be positive"));
        }
        Ok(Self {
            half_max_density,
            max_intake,
        })
    }

    /// Realized intake rate at the given forage density.
    pub fn intake_rate(&self, density: f64) -> Result<f64> {
        if density < 0.0 {
            return Err(SimError::invalid("forage density must not be negative"));
        }
        Ok(self.max_intake * density / (self.half_max_density + density))
    }
}
