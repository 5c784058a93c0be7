//! A herbivore's energy budget with fat reserves.
//!
//! Terminology:
//! - Anabolism  = build up fat mass
//! - Catabolism = burn fat mass
//! - Metabolism = burn food energy directly and store the surplus as fat

use crate::error::{Result, SimError};

/// Conversion factor from net forage energy to fat mass [MJ/kg], after
/// Blaxter (1989).
pub const DEFAULT_ANABOLISM_COEFFICIENT: f64 = 54.6;

/// Conversion factor from fat mass to net energy [MJ/kg]: gross energy of
/// fat times mobilization efficiency, after Blaxter (1989).
pub const DEFAULT_CATABOLISM_COEFFICIENT: f64 = 39.3;

/// Fat reserves and unmet energy needs of one herbivore individual.
///
/// Daily life cycle: `add_energy_needs` (expenditure) → `metabolize_energy`
/// (feeding) → `catabolize_fat` (whatever stayed unmet burns reserves).
#[derive(Debug, Clone, PartialEq)]
pub struct FatmassEnergyBudget {
    anabolism_coefficient: f64,  // MJ/kg
    catabolism_coefficient: f64, // MJ/kg
    energy_needs: f64,           // MJ/ind
    fatmass: f64,                // kg/ind
    max_fatmass: f64,            // kg/ind
    max_fatmass_gain: f64,       // kg/ind/day, 0.0 = no limit
}

impl FatmassEnergyBudget {
    /// Create a budget with the given initial and maximum fat mass [kg/ind].
    pub fn new(
        initial_fatmass: f64,
        maximum_fatmass: f64,
        anabolism_coefficient: f64,
        catabolism_coefficient: f64,
    ) -> Result<Self> {
        if anabolism_coefficient <= 0.0 {
            return Err(SimError::invalid("anabolism coefficient must be positive"));
        }
        if catabolism_coefficient <= 0.0 {
            return Err(SimError::invalid("catabolism coefficient must be positive"));
        }
        if initial_fatmass < 0.0 || !initial_fatmass.is_finite() {
            return Err(SimError::invalid("initial fat mass must be non-negative"));
        }
        if maximum_fatmass <= 0.0 || !maximum_fatmass.is_finite() {
            return Err(SimError::invalid("maximum fat mass must be positive"));
        }
        // Allow for floating-point imprecision up to 10 g/ind.
        if initial_fatmass > maximum_fatmass + 0.01 {
            return Err(SimError::logic(
                "initial fat mass exceeds the maximum fat mass",
            ));
        }
        Ok(Self {
            anabolism_coefficient,
            catabolism_coefficient,
            energy_needs: 0.0,
            fatmass: initial_fatmass.min(maximum_fatmass),
            max_fatmass: maximum_fatmass,
            max_fatmass_gain: 0.0,
        })
    }

    /// Increase the unmet energy needs [MJ/ind].
    pub fn add_energy_needs(&mut self, energy: f64) -> Result<()> {
        if energy < 0.0 || !energy.is_finite() {
            return Err(SimError::invalid("added energy needs must be non-negative"));
        }
        self.energy_needs += energy;
        Ok(())
    }

    /// Burn fat reserves to settle the remaining energy needs. Fat never
    /// drops below zero; needs are reset in any case.
    pub fn catabolize_fat(&mut self) {
        if self.energy_needs == 0.0 {
            return;
        }
        let burned_fatmass = self.energy_needs / self.catabolism_coefficient;
        self.fatmass = (self.fatmass - burned_fatmass).max(0.0);
        self.energy_needs = 0.0;
    }

    /// Overwrite the fat reserves as a fraction of the maximum.
    pub fn force_body_condition(&mut self, body_condition: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&body_condition) {
            return Err(SimError::invalid("body condition must be within [0,1]"));
        }
        self.fatmass = self.max_fatmass * body_condition;
        Ok(())
    }

    /// Current unmet energy needs [MJ/ind].
    #[must_use]
    pub fn energy_needs(&self) -> f64 {
        self.energy_needs
    }

    /// Current fat mass [kg/ind].
    #[must_use]
    pub fn fatmass(&self) -> f64 {
        self.fatmass
    }

    /// Maximum fat mass [kg/ind].
    #[must_use]
    pub fn max_fatmass(&self) -> f64 {
        self.max_fatmass
    }

    /// The most energy [MJ/ind] that could go into fat build-up today.
    #[must_use]
    pub fn max_anabolism_per_day(&self) -> f64 {
        let mut increment = self.max_fatmass - self.fatmass;
        if self.max_fatmass_gain != 0.0 {
            increment = increment.min(self.max_fatmass_gain);
        }
        increment * self.anabolism_coefficient
    }

    /// Merge with another budget by building weighted averages.
    pub fn merge(&mut self, other: &FatmassEnergyBudget, this_weight: f64, other_weight: f64) {
        let weight_sum = this_weight + other_weight;
        debug_assert!(weight_sum > 0.0);
        self.energy_needs =
            (self.energy_needs * this_weight + other.energy_needs * other_weight) / weight_sum;
        self.fatmass = (self.fatmass * this_weight + other.fatmass * other_weight) / weight_sum;
        self.max_fatmass =
            (self.max_fatmass * this_weight + other.max_fatmass * other_weight) / weight_sum;
    }

    /// Receive net energy [MJ/ind] from feeding: energy needs are paid
    /// down first; any surplus is stored as fat.
    ///
    /// The caller is responsible for clipping its intake to
    /// [`Self::max_anabolism_per_day`]; a surplus exceeding the maximum
    /// fat mass by more than 0.1 % is a logic violation. Smaller
    /// overshoots are clipped silently.
    pub fn metabolize_energy(&mut self, energy: f64) -> Result<()> {
        if energy < 0.0 || !energy.is_finite() {
            return Err(SimError::invalid("metabolized energy must be non-negative"));
        }
        if energy <= self.energy_needs {
            self.energy_needs -= energy;
            return Ok(());
        }
        let surplus = energy - self.energy_needs;
        self.energy_needs = 0.0;

        let fatmass_gain = surplus / self.anabolism_coefficient;
        if self.fatmass + fatmass_gain > 1.001 * self.max_fatmass {
            return Err(SimError::logic(
                "received energy exceeds the maximum allowed fat anabolism",
            ));
        }
        self.fatmass = (self.fatmass + fatmass_gain).min(self.max_fatmass);
        Ok(())
    }

    /// Update the maximum fat mass [kg/ind] and the daily gain limit
    /// [kg/ind/day] (zero = no limit) as the animal grows.
    pub fn set_max_fatmass(&mut self, max_fatmass: f64, max_gain: f64) -> Result<()> {
        if max_fatmass < self.fatmass {
            return Err(SimError::logic(
                "new maximum fat mass is below the current fat mass",
            ));
        }
        if max_fatmass <= 0.0 {
            return Err(SimError::invalid("maximum fat mass must be positive"));
        }
        if max_gain < 0.0 {
            return Err(SimError::invalid("maximum fat gain must not be negative"));
        }
        self.max_fatmass = max_fatmass;
        self.max_fatmass_gain = max_gain;
        Ok(())
    }
}
