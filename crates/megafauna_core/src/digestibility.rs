//! Digestibility models for host vegetation.
//!
//! The habitat reports digestibility to the engine; these helpers let a
//! host vegetation model (or the bundled demo habitat) derive that value
//! from its plant state.

use crate::error::{Result, SimError};
use std::collections::VecDeque;

/// Digestibility of dead (non-functional) grass.
pub const DIG_DEAD_GRASS: f64 = 0.4;

/// Upper bound for live grass digestibility.
pub const DIG_LIVE_GRASS: f64 = 0.8;

/// Days for forage to go from “fresh” to “dead” quality.
pub const ATTRITION_PERIOD: usize = 365;

/// Grass digestibility as a biomass-dependent live/dead mix, mimicking
/// Pachzelt et al. (2013).
///
/// The phenology fraction is read as the share of live (green) grass; the
/// rest is dead grass with digestibility [`DIG_DEAD_GRASS`]. Live grass
/// digestibility falls with live grass density via the crude protein
/// content `CPC = 0.208790·V^-0.1697` (van Wijngaarden 1985) and
/// `d = 0.4605 + 1.4152·CPC` (Bredon & Wilson 1963), with the live grass
/// density V in kgDM/m².
pub fn digestibility_pachzelt_2013(live_grass_density: f64, phenology: f64) -> Result<f64> {
    if live_grass_density < 0.0 {
        return Err(SimError::invalid("grass density must not be negative"));
    }
    if !(0.0..=1.0).contains(&phenology) {
        return Err(SimError::invalid("phenology must be within [0,1]"));
    }
    if live_grass_density <= 0.0 {
        return Ok(DIG_DEAD_GRASS);
    }
    let crude_protein = 0.208790 * live_grass_density.powf(-0.1697);
    let live_digestibility = (0.4605 + 1.4152 * crude_protein).min(DIG_LIVE_GRASS);
    Ok(live_digestibility * phenology + DIG_DEAD_GRASS * (1.0 - phenology))
}

/// Average digestibility from a record of daily production.
///
/// Each entry in `weights` is the biomass grown on one day in the past:
/// `weights[0]` is today's growth, `weights[1]` is yesterday's, and so on.
/// The digestibility of each portion decreases linearly from
/// `dig_fresh` to `dig_dead` over [`ATTRITION_PERIOD`] days; older forage
/// stays at `dig_dead`. Returns zero for an empty record.
pub fn digestibility_from_npp(
    weights: &VecDeque<f64>,
    dig_fresh: f64,
    dig_dead: f64,
) -> Result<f64> {
    if !(0.0..=1.0).contains(&dig_fresh) || !(0.0..=1.0).contains(&dig_dead) {
        return Err(SimError::invalid("digestibility must be within [0,1]"));
    }
    if dig_dead > dig_fresh {
        return Err(SimError::logic(
            "dead digestibility must not exceed fresh digestibility",
        ));
    }
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (age_days, weight) in weights.iter().enumerate() {
        if *weight < 0.0 {
            return Err(SimError::invalid("production weights must not be negative"));
        }
        let senescence = (age_days as f64 / ATTRITION_PERIOD as f64).min(1.0);
        let digestibility = dig_fresh - senescence * (dig_fresh - dig_dead);
        weighted_sum += digestibility * weight;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        return Ok(0.0);
    }
    Ok(weighted_sum / weight_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pachzelt_bounds() {
        assert!(digestibility_pachzelt_2013(-1.0, 0.5).is_err());
        assert!(digestibility_pachzelt_2013(1.0, 1.5).is_err());
        // No live grass at all falls back to dead-grass digestibility.
        assert_eq!(digestibility_pachzelt_2013(0.0, 0.5).unwrap(), DIG_DEAD_GRASS);
    }

    #[test]
    fn test_pachzelt_mixes_live_and_dead() {
        let dead_only = digestibility_pachzelt_2013(0.1, 0.0).unwrap();
        let live_only = digestibility_pachzelt_2013(0.1, 1.0).unwrap();
        let mixed = digestibility_pachzelt_2013(0.1, 0.5).unwrap();
        assert_eq!(dead_only, DIG_DEAD_GRASS);
        assert!(live_only > dead_only);
        assert!((mixed - (live_only + dead_only) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pachzelt_sparse_grass_is_richer() {
        // Crude protein, and with it digestibility, falls with density.
        let sparse = digestibility_pachzelt_2013(0.01, 1.0).unwrap();
        let dense = digestibility_pachzelt_2013(1.0, 1.0).unwrap();
        assert!(sparse >= dense);
        assert!(sparse <= DIG_LIVE_GRASS);
    }

    #[test]
    fn test_npp_empty_record() {
        let record = VecDeque::new();
        assert_eq!(digestibility_from_npp(&record, 0.7, 0.4).unwrap(), 0.0);
    }

    #[test]
    fn test_npp_fresh_only() {
        let record: VecDeque<f64> = [1.0].into();
        assert!((digestibility_from_npp(&record, 0.7, 0.4).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_npp_senescence_interpolates() {
        // Equal biomass from today and from half an attrition period ago.
        let mut record: VecDeque<f64> = VecDeque::new();
        record.push_back(1.0);
        for _ in 0..(ATTRITION_PERIOD / 2 - 1) {
            record.push_back(0.0);
        }
        record.push_back(1.0);
        let expected = (0.7 + (0.7 + 0.4) / 2.0) / 2.0;
        let result = digestibility_from_npp(&record, 0.7, 0.4).unwrap();
        assert!((result - expected).abs() < 1e-3);
    }

    #[test]
    fn test_npp_validation() {
        let record: VecDeque<f64> = [1.0].into();
        assert!(digestibility_from_npp(&record, 0.4, 0.7).is_err());
        assert!(digestibility_from_npp(&record, 1.2, 0.4).is_err());
        let negative: VecDeque<f64> = [-1.0].into();
        assert!(digestibility_from_npp(&negative, 0.7, 0.4).is_err());
    }
}
