//! Typed per-forage-type value maps with checked arithmetic.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

/// The edible forage types known to the model.
///
/// Plant matter that herbivores cannot eat is simply never mapped to a
/// forage type, so forage-value maps range over edible types only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForageType {
    Grass,
    // Browse and other forage types slot in here.
}

/// Number of forage types.
pub const FORAGE_TYPE_COUNT: usize = 1;

impl ForageType {
    /// All forage types, in canonical order.
    pub const ALL: [ForageType; FORAGE_TYPE_COUNT] = [ForageType::Grass];

    /// Short lowercase identifier, used in output table captions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ForageType::Grass => "grass",
        }
    }

    fn index(self) -> usize {
        match self {
            ForageType::Grass => 0,
        }
    }
}

/// Errors from constructing or combining forage-value maps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForageValueError {
    #[error("value {value} for {forage_type} violates constraint \"{constraint}\"")]
    ConstraintViolated {
        forage_type: &'static str,
        value: f64,
        constraint: &'static str,
    },

    #[error("value for {forage_type} is NaN or infinite")]
    NotFinite { forage_type: &'static str },

    #[error("division by zero for {forage_type}")]
    DivisionByZero { forage_type: &'static str },

    #[error("weights for merging must be positive, got {this_weight} and {other_weight}")]
    BadMergeWeights { this_weight: f64, other_weight: f64 },
}

/// Constraint tag for a [`ForageValues`] map.
pub trait ValueConstraint {
    /// Human-readable name of the constraint, for error messages.
    const NAME: &'static str;

    /// Whether a finite value satisfies the constraint.
    fn contains(value: f64) -> bool;
}

/// All values are ≥ 0 (masses, energies, energy contents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonNegative;

impl ValueConstraint for NonNegative {
    const NAME: &'static str = "non-negative";

    fn contains(value: f64) -> bool {
        value >= 0.0
    }
}

/// All values are within [0, 1] (fractions, digestibilities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFraction;

impl ValueConstraint for UnitFraction {
    const NAME: &'static str = "within [0,1]";

    fn contains(value: f64) -> bool {
        (0.0..=1.0).contains(&value)
    }
}

/// A total mapping from forage type to a checked real number.
///
/// The constraint tag `C` decides which values are representable. Every
/// mutation validates against the tag; arithmetic that cannot leave the
/// constraint set is infallible, everything else returns a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForageValues<C: ValueConstraint> {
    values: [f64; FORAGE_TYPE_COUNT],
    #[serde(skip)]
    constraint: PhantomData<C>,
}

/// Dry-matter forage mass [kgDM or kgDM/km²].
pub type ForageMass = ForageValues<NonNegative>;

/// Net or metabolizable energy [MJ].
pub type ForageEnergy = ForageValues<NonNegative>;

/// Energy content of forage dry matter [MJ/kgDM].
pub type ForageEnergyContent = ForageValues<NonNegative>;

/// Proportions per forage type [0–1].
pub type ForageFraction = ForageValues<UnitFraction>;

/// Fractional dry-matter digestibility per forage type.
pub type Digestibility = ForageValues<UnitFraction>;

impl<C: ValueConstraint> ForageValues<C> {
    /// Map with every forage type set to the same value.
    pub fn broadcast(value: f64) -> Result<Self, ForageValueError> {
        Self::check(ForageType::Grass, value)?;
        Ok(Self {
            values: [value; FORAGE_TYPE_COUNT],
            constraint: PhantomData,
        })
    }

    /// Map with all values zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            values: [0.0; FORAGE_TYPE_COUNT],
            constraint: PhantomData,
        }
    }

    /// Read the value for one forage type.
    #[must_use]
    pub fn get(&self, forage_type: ForageType) -> f64 {
        self.values[forage_type.index()]
    }

    /// Set the value for one forage type, validating the constraint.
    pub fn set(&mut self, forage_type: ForageType, value: f64) -> Result<(), ForageValueError> {
        Self::check(forage_type, value)?;
        self.values[forage_type.index()] = value;
        Ok(())
    }

    /// Sum over all forage types.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Component-wise minimum of two maps.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        self.zip_unchecked(other, f64::min)
    }

    /// Component-wise addition. Fails if a sum violates the constraint
    /// (e.g. two fractions adding up beyond 1).
    pub fn checked_add(&self, other: &Self) -> Result<Self, ForageValueError> {
        self.zip(other, |a, b| a + b)
    }

    /// Component-wise subtraction. Fails if a difference violates the
    /// constraint (e.g. a negative mass).
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ForageValueError> {
        self.zip(other, |a, b| a - b)
    }

    /// Component-wise multiplication with another map of the same tag.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, ForageValueError> {
        self.zip(other, |a, b| a * b)
    }

    /// Multiply every component by a scalar.
    pub fn scaled(&self, factor: f64) -> Result<Self, ForageValueError> {
        self.map(|v| v * factor)
    }

    /// Component-wise division that substitutes `fallback` wherever the
    /// divisor is zero.
    pub fn divide_safely<D: ValueConstraint>(
        &self,
        divisor: &ForageValues<D>,
        fallback: f64,
    ) -> Result<Self, ForageValueError> {
        let mut result = Self::zero();
        for ft in ForageType::ALL {
            let d = divisor.get(ft);
            let value = if d == 0.0 { fallback } else { self.get(ft) / d };
            result.set(ft, value)?;
        }
        Ok(result)
    }

    /// Component-wise division. Fails explicitly on a zero divisor.
    pub fn checked_div(&self, divisor: &Self) -> Result<Self, ForageValueError> {
        for ft in ForageType::ALL {
            if divisor.get(ft) == 0.0 {
                return Err(ForageValueError::DivisionByZero {
                    forage_type: ft.name(),
                });
            }
        }
        self.zip(divisor, |a, b| a / b)
    }

    /// Weighted average of two maps. The weights must be positive in sum.
    pub fn merge(
        &self,
        other: &Self,
        this_weight: f64,
        other_weight: f64,
    ) -> Result<Self, ForageValueError> {
        if !(this_weight >= 0.0 && other_weight >= 0.0 && this_weight + other_weight > 0.0) {
            return Err(ForageValueError::BadMergeWeights {
                this_weight,
                other_weight,
            });
        }
        self.zip(other, |a, b| {
            (a * this_weight + b * other_weight) / (this_weight + other_weight)
        })
    }

    fn check(forage_type: ForageType, value: f64) -> Result<(), ForageValueError> {
        if !value.is_finite() {
            return Err(ForageValueError::NotFinite {
                forage_type: forage_type.name(),
            });
        }
        if !C::contains(value) {
            return Err(ForageValueError::ConstraintViolated {
                forage_type: forage_type.name(),
                value,
                constraint: C::NAME,
            });
        }
        Ok(())
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Result<Self, ForageValueError> {
        let mut result = Self::zero();
        for ft in ForageType::ALL {
            result.set(ft, f(self.get(ft)))?;
        }
        Ok(result)
    }

    fn zip(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, ForageValueError> {
        let mut result = Self::zero();
        for ft in ForageType::ALL {
            result.set(ft, f(self.get(ft), other.get(ft)))?;
        }
        Ok(result)
    }

    fn zip_unchecked(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut values = [0.0; FORAGE_TYPE_COUNT];
        for ft in ForageType::ALL {
            values[ft.index()] = f(self.get(ft), other.get(ft));
        }
        Self {
            values,
            constraint: PhantomData,
        }
    }
}

impl<C: ValueConstraint> Default for ForageValues<C> {
    fn default() -> Self {
        Self::zero()
    }
}

/// Strict component-wise comparison: two maps are ordered only if every
/// component agrees on the ordering.
impl<C: ValueConstraint + PartialEq> PartialOrd for ForageValues<C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        let mut ordering = Ordering::Equal;
        for ft in ForageType::ALL {
            let component = self.get(ft).partial_cmp(&other.get(ft))?;
            match (ordering, component) {
                (Ordering::Equal, _) => ordering = component,
                (_, Ordering::Equal) => {}
                _ if ordering != component => return None,
                _ => {}
            }
        }
        Some(ordering)
    }
}

impl ForageMass {
    /// Convert dry-matter mass to energy via an energy content [MJ/kgDM].
    #[must_use]
    pub fn to_energy(&self, content: &ForageEnergyContent) -> ForageEnergy {
        self.zip_unchecked(content, |kg, mj_per_kg| kg * mj_per_kg)
    }

    /// Scale each component by a fraction.
    #[must_use]
    pub fn scaled_by_fraction(&self, fractions: &ForageFraction) -> Self {
        let mut result = Self::zero();
        for ft in ForageType::ALL {
            result.values[ft.index()] = self.get(ft) * fractions.get(ft);
        }
        result
    }

    /// Normalize this mass vector into proportions summing to 1.
    ///
    /// A zero vector yields zero proportions.
    pub fn to_proportions(&self) -> Result<ForageFraction, ForageValueError> {
        let total = self.sum();
        let mut result = ForageFraction::zero();
        if total > 0.0 {
            for ft in ForageType::ALL {
                result.set(ft, self.get(ft) / total)?;
            }
        }
        Ok(result)
    }
}

impl ForageEnergy {
    /// Convert energy back to dry-matter mass. Forage types with zero
    /// energy content yield zero mass.
    pub fn to_mass(&self, content: &ForageEnergyContent) -> Result<ForageMass, ForageValueError> {
        let as_mass = ForageMass {
            values: self.values,
            constraint: PhantomData,
        };
        as_mass.divide_safely(content, 0.0)
    }
}

impl ForageFraction {
    /// Reinterpret the fractions as a mass vector.
    ///
    /// Together with [`ForageMass::to_proportions`] this forms the
    /// round-trip pair for vectors whose fractions sum to 1.
    #[must_use]
    pub fn as_mass(&self) -> ForageMass {
        ForageMass {
            values: self.values,
            constraint: PhantomData,
        }
    }
}

/// Convert energy-wise diet proportions into mass-wise proportions.
///
/// The mass proportions are normalized so that their sum equals the sum of
/// the energy proportions. Forage types with zero energy content get a
/// zero share.
pub fn convert_mj_to_kg_proportionally(
    mj_per_kg: &ForageEnergyContent,
    mj_proportions: &ForageFraction,
) -> Result<ForageFraction, ForageValueError> {
    let raw = mj_proportions.as_mass().divide_safely(mj_per_kg, 0.0)?;
    let raw_sum = raw.sum();
    let mut result = ForageFraction::zero();
    if raw_sum > 0.0 {
        let target_sum = mj_proportions.sum();
        for ft in ForageType::ALL {
            result.set(ft, raw.get(ft) / raw_sum * target_sum)?;
        }
    }
    Ok(result)
}
