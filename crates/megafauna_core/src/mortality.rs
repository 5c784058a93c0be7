//! Herbivore mortality factors.

use crate::error::{Result, SimError};

/// Constant background mortality with separate rates for the first year
/// of life and the rest of life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetBackgroundMortality {
    annual_mortality_1st_year: f64,
    annual_mortality: f64,
}

impl GetBackgroundMortality {
    pub fn new(annual_mortality_1st_year: f64, annual_mortality: f64) -> Result<Self> {
        for rate in [annual_mortality_1st_year, annual_mortality] {
            if !(0.0..1.0).contains(&rate) {
                return Err(SimError::invalid(
                    "annual mortality must be within [0,1)",
                ));
            }
        }
        Ok(Self {
            annual_mortality_1st_year,
            annual_mortality,
        })
    }

    /// Today's fractional mortality. The daily rate is chosen so that
    /// survival compounded over 365 days equals `1 − annual`.
    #[must_use]
    pub fn mortality(&self, age_days: u32) -> f64 {
        let annual = if age_days < 365 {
            self.annual_mortality_1st_year
        } else {
            self.annual_mortality
        };
        1.0 - (1.0 - annual).powf(1.0 / 365.0)
    }
}

/// Death when the given lifespan is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetSimpleLifespanMortality {
    lifespan_years: u32,
}

impl GetSimpleLifespanMortality {
    pub fn new(lifespan_years: u32) -> Result<Self> {
        if lifespan_years == 0 {
            return Err(SimError::invalid("lifespan must be positive"));
        }
        Ok(Self { lifespan_years })
    }

    /// 0.0 before the lifespan is reached, 1.0 from then on.
    #[must_use]
    pub fn mortality(&self, age_days: u32) -> f64 {
        if age_days >= self.lifespan_years * 365 {
            1.0
        } else {
            0.0
        }
    }
}

/// Death when proportional body fat drops below a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetStarvationMortalityThreshold {
    minimum_body_fat: f64,
}

/// Default minimum body fat for [`GetStarvationMortalityThreshold`].
pub const DEFAULT_MINIMUM_BODY_FAT: f64 = 0.05;

impl GetStarvationMortalityThreshold {
    pub fn new(minimum_body_fat: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&minimum_body_fat) {
            return Err(SimError::invalid(
                "minimum body fat must be within [0,1)",
            ));
        }
        Ok(Self { minimum_body_fat })
    }

    /// 1.0 below the minimum body fat, else 0.0.
    pub fn mortality(&self, body_fat: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&body_fat) {
            return Err(SimError::invalid("body fat must be within [0,1]"));
        }
        if body_fat < self.minimum_body_fat {
            Ok(1.0)
        } else {
            Ok(0.0)
        }
    }
}

/// Starvation mortality after Illius & O’Connor (2000).
///
/// Body fat is assumed normally distributed across the cohort; the
/// fraction of the distribution below zero dies today. Because the
/// starving tail of the distribution is removed, the surviving mean body
/// condition can optionally be shifted up by `1/(1−d)`: the cohort's total
/// fat stays the same and is redistributed over the survivors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetStarvationIlliusOConnor2000 {
    fat_standard_deviation: f64,
    shift_body_condition: bool,
}

impl GetStarvationIlliusOConnor2000 {
    /// The standard deviation is the cohort's body-fat spread as a
    /// fraction of maximum fat mass; Illius & O’Connor (2000) use 12.5 %,
    /// citing Ledger (1968).
    pub fn new(fat_standard_deviation: f64, shift_body_condition: bool) -> Result<Self> {
        if !(0.0..=1.0).contains(&fat_standard_deviation) {
            return Err(SimError::invalid(
                "fat standard deviation must be within [0,1]",
            ));
        }
        Ok(Self {
            fat_standard_deviation,
            shift_body_condition,
        })
    }

    /// Today's mortality together with the (possibly shifted) new mean
    /// body condition of the surviving cohort.
    pub fn mortality(&self, body_condition: f64) -> Result<(f64, f64)> {
        if !(0.0..=1.0).contains(&body_condition) {
            return Err(SimError::invalid("body condition must be within [0,1]"));
        }
        if self.fat_standard_deviation == 0.0 {
            // Degenerate distribution: everything dies at zero fat.
            let mortality = if body_condition <= 0.0 { 1.0 } else { 0.0 };
            return Ok((mortality, body_condition));
        }
        let mortality =
            cumulative_normal_distribution(-body_condition / self.fat_standard_deviation);
        let new_body_condition = if self.shift_body_condition && mortality < 1.0 {
            (body_condition / (1.0 - mortality)).min(1.0)
        } else {
            body_condition
        };
        Ok((mortality, new_body_condition))
    }
}

/// Standard normal cumulative distribution Φ, by the approximation of
/// Abramowitz & Stegun (formula 7.1.26); absolute error below 1.5e-7.
fn cumulative_normal_distribution(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_compounds_to_annual_rate() {
        let annual = 0.1;
        let mortality = GetBackgroundMortality::new(0.3, annual).unwrap();
        let daily = mortality.mortality(400);
        let survival: f64 = (1.0 - daily).powi(365);
        assert!((survival - (1.0 - annual)).abs() < 1e-9);
    }

    #[test]
    fn test_background_juvenile_rate() {
        let mortality = GetBackgroundMortality::new(0.3, 0.1).unwrap();
        assert!(mortality.mortality(0) > mortality.mortality(365));
        assert!(GetBackgroundMortality::new(1.0, 0.1).is_err());
        assert!(GetBackgroundMortality::new(0.1, -0.1).is_err());
    }

    #[test]
    fn test_lifespan() {
        let mortality = GetSimpleLifespanMortality::new(10).unwrap();
        assert_eq!(mortality.mortality(10 * 365 - 1), 0.0);
        assert_eq!(mortality.mortality(10 * 365), 1.0);
        assert!(GetSimpleLifespanMortality::new(0).is_err());
    }

    #[test]
    fn test_starvation_threshold() {
        let mortality = GetStarvationMortalityThreshold::new(0.05).unwrap();
        assert_eq!(mortality.mortality(0.049).unwrap(), 1.0);
        assert_eq!(mortality.mortality(0.05).unwrap(), 0.0);
        assert!(mortality.mortality(-0.1).is_err());
        assert!(GetStarvationMortalityThreshold::new(1.0).is_err());
    }

    #[test]
    fn test_starvation_illius_oconnor_boundaries() {
        let starvation = GetStarvationIlliusOConnor2000::new(0.125, false).unwrap();
        // Full reserves: practically no starvation.
        let (full, _) = starvation.mortality(1.0).unwrap();
        assert!(full < 1e-6);
        // Zero mean fat: half of the distribution lies below zero.
        let (empty, _) = starvation.mortality(0.0).unwrap();
        assert!((empty - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_starvation_illius_oconnor_monotonic() {
        let starvation = GetStarvationIlliusOConnor2000::new(0.125, false).unwrap();
        let (poor, _) = starvation.mortality(0.1).unwrap();
        let (better, _) = starvation.mortality(0.2).unwrap();
        assert!(poor > better);
    }

    #[test]
    fn test_starvation_shift_redistributes_fat() {
        let shifting = GetStarvationIlliusOConnor2000::new(0.125, true).unwrap();
        let (mortality, shifted) = shifting.mortality(0.1).unwrap();
        assert!(mortality > 0.0);
        assert!((shifted - 0.1 / (1.0 - mortality)).abs() < 1e-9);

        let fixed = GetStarvationIlliusOConnor2000::new(0.125, false).unwrap();
        let (_, unshifted) = fixed.mortality(0.1).unwrap();
        assert_eq!(unshifted, 0.1);
    }

    #[test]
    fn test_cumulative_normal_distribution() {
        assert!((cumulative_normal_distribution(0.0) - 0.5).abs() < 1e-7);
        assert!((cumulative_normal_distribution(1.96) - 0.975).abs() < 1e-3);
        assert!((cumulative_normal_distribution(-1.96) - 0.025).abs() < 1e-3);
    }
}
