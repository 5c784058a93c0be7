//! Reproduction within a breeding season.

use crate::error::{Result, SimError};

/// A julian-day window in which parturition occurs; may wrap across the
/// year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreedingSeason {
    start: u16,
    length: u16,
}

impl BreedingSeason {
    pub fn new(start: u16, length: u16) -> Result<Self> {
        if start > 364 {
            return Err(SimError::invalid(
                "breeding season start must be within [0,364]",
            ));
        }
        if !(1..=365).contains(&length) {
            return Err(SimError::invalid(
                "breeding season length must be within [1,365]",
            ));
        }
        Ok(Self { start, length })
    }

    /// Whether the given day of year (0 = Jan 1st) falls into the season.
    pub fn is_in_season(&self, day: u16) -> Result<bool> {
        if day > 364 {
            return Err(SimError::invalid("day must be within [0,364]"));
        }
        let end = self.start as u32 + self.length as u32;
        if end <= 365 {
            Ok(day >= self.start && (day as u32) < end)
        } else {
            // The season wraps around the end of the year.
            Ok(day >= self.start || (day as u32) < end % 365)
        }
    }

    /// Spread an annual rate evenly over the days of the season.
    #[must_use]
    pub fn annual_to_daily_rate(&self, annual: f64) -> f64 {
        annual / self.length as f64
    }
}

/// Reproduction rate models. All yield offspring per female per day,
/// zero outside the breeding season.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reproduction {
    /// Logistic dependence on body condition after Illius & O’Connor
    /// (2000): annually `k / (1 + e^(−15·(bc − 0.3)))`.
    IlliusOConnor2000 {
        season: BreedingSeason,
        max_annual_increase: f64,
    },
    /// Constant annual increase, independent of body condition.
    ConstMax {
        season: BreedingSeason,
        annual_increase: f64,
    },
    /// Annual rate grows linearly with body condition: `k·bc`.
    Linear {
        season: BreedingSeason,
        max_annual_increase: f64,
    },
}

impl Reproduction {
    fn check(season: BreedingSeason, annual: f64) -> Result<(BreedingSeason, f64)> {
        if annual < 0.0 {
            return Err(SimError::invalid(
                "maximum annual increase must not be negative",
            ));
        }
        Ok((season, annual))
    }

    pub fn illius_oconnor_2000(season: BreedingSeason, max_annual_increase: f64) -> Result<Self> {
        let (season, max_annual_increase) = Self::check(season, max_annual_increase)?;
        Ok(Self::IlliusOConnor2000 {
            season,
            max_annual_increase,
        })
    }

    pub fn const_max(season: BreedingSeason, annual_increase: f64) -> Result<Self> {
        let (season, annual_increase) = Self::check(season, annual_increase)?;
        Ok(Self::ConstMax {
            season,
            annual_increase,
        })
    }

    pub fn linear(season: BreedingSeason, max_annual_increase: f64) -> Result<Self> {
        let (season, max_annual_increase) = Self::check(season, max_annual_increase)?;
        Ok(Self::Linear {
            season,
            max_annual_increase,
        })
    }

    /// Average offspring per female for the given day.
    pub fn offspring_per_day(&self, day_of_year: u16, body_condition: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&body_condition) {
            return Err(SimError::invalid("body condition must be within [0,1]"));
        }
        let season = match self {
            Self::IlliusOConnor2000 { season, .. }
            | Self::ConstMax { season, .. }
            | Self::Linear { season, .. } => season,
        };
        if !season.is_in_season(day_of_year)? {
            return Ok(0.0);
        }
        let annual = match self {
            Self::IlliusOConnor2000 {
                max_annual_increase,
                ..
            } => max_annual_increase / (1.0 + (-15.0 * (body_condition - 0.3)).exp()),
            Self::ConstMax {
                annual_increase, ..
            } => *annual_increase,
            Self::Linear {
                max_annual_increase,
                ..
            } => max_annual_increase * body_condition,
        };
        Ok(season.annual_to_daily_rate(annual))
    }
}
