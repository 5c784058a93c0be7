//! Daily energy expenditure components.

use crate::error::{Result, SimError};
use megafauna_data::ConductanceModel;

/// Watts per MJ/day.
const WATTS_PER_MJ_PER_DAY: f64 = 1.0e6 / (24.0 * 3600.0);

/// Basal field metabolic rate [MJ/ind/day] after Taylor et al. (1981):
/// `0.4·M·M_ad^-0.27`, where M is the current and M_ad the adult body
/// mass [kg].
pub fn expenditure_taylor_1981(bodymass: f64, bodymass_adult: f64) -> Result<f64> {
    if bodymass <= 0.0 || bodymass_adult <= 0.0 {
        return Err(SimError::invalid("body mass must be positive"));
    }
    Ok(0.4 * bodymass * bodymass_adult.powf(-0.27))
}

/// Temperature-dependent maintenance expenditure [MJ/ind/day] after Zhu
/// et al. (2018): `0.36·e^(−0.0079·T)·M^0.75` with T in °C.
pub fn expenditure_zhu_et_al_2018(bodymass: f64, ambient_temperature: f64) -> Result<f64> {
    if bodymass <= 0.0 {
        return Err(SimError::invalid("body mass must be positive"));
    }
    Ok(0.36 * (-0.0079 * ambient_temperature).exp() * bodymass.powf(0.75))
}

/// Whole-body thermal conductance [W/°C] for one individual.
///
/// The allometric model is from Bradley & Deavers (1980): `0.224·M^0.574`.
pub fn conductance(model: ConductanceModel, bodymass: f64) -> Result<f64> {
    if bodymass <= 0.0 {
        return Err(SimError::invalid("body mass must be positive"));
    }
    match model {
        ConductanceModel::BradleyDeavers1980 => Ok(0.224 * bodymass.powf(0.574)),
        ConductanceModel::Constant(watts_per_celsius) => {
            if watts_per_celsius <= 0.0 {
                return Err(SimError::invalid("constant conductance must be positive"));
            }
            Ok(watts_per_celsius)
        }
    }
}

/// Extra heat-loss compensation [MJ/ind/day] for ambient temperatures
/// below the lower critical temperature.
///
/// The thermoneutral expenditure defines how much heat the animal
/// dissipates anyway. Below `T_crit = T_core − E/C` the full conductance
/// heat loss `C·(T_crit − T_air)` must be paid on top.
pub fn thermoregulation_expenditure(
    thermoneutral_expenditure: f64,
    conductance_watts_per_celsius: f64,
    core_temperature: f64,
    ambient_temperature: f64,
) -> Result<f64> {
    if thermoneutral_expenditure < 0.0 {
        return Err(SimError::invalid(
            "thermoneutral expenditure must not be negative",
        ));
    }
    if conductance_watts_per_celsius <= 0.0 {
        return Err(SimError::invalid("conductance must be positive"));
    }
    let thermoneutral_watts = thermoneutral_expenditure * WATTS_PER_MJ_PER_DAY;
    let lower_critical = core_temperature - thermoneutral_watts / conductance_watts_per_celsius;
    if ambient_temperature >= lower_critical {
        return Ok(0.0);
    }
    let heat_loss_watts = conductance_watts_per_celsius * (lower_critical - ambient_temperature);
    Ok(heat_loss_watts / WATTS_PER_MJ_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taylor_1981() {
        let current = 90.0;
        let adult: f64 = 100.0;
        let expected = 0.4 * current * adult.powf(-0.27);
        assert!((expenditure_taylor_1981(current, adult).unwrap() - expected).abs() < 1e-12);
        assert!(expenditure_taylor_1981(0.0, adult).is_err());
        assert!(expenditure_taylor_1981(current, -1.0).is_err());
    }

    #[test]
    fn test_zhu_et_al_2018() {
        let mass: f64 = 100.0;
        let temp = 20.0;
        assert!(expenditure_zhu_et_al_2018(-4.0, temp).is_err());
        assert!(expenditure_zhu_et_al_2018(0.0, temp).is_err());
        let expected = 0.36 / (0.0079 * temp).exp() * mass.powf(0.75);
        assert!((expenditure_zhu_et_al_2018(mass, temp).unwrap() - expected).abs() < 1e-12);
        // Lower temperature costs more energy.
        assert!(
            expenditure_zhu_et_al_2018(mass, temp).unwrap()
                < expenditure_zhu_et_al_2018(mass, temp - 20.0).unwrap()
        );
    }

    #[test]
    fn test_conductance_scales_with_mass() {
        let small = conductance(ConductanceModel::BradleyDeavers1980, 10.0).unwrap();
        let large = conductance(ConductanceModel::BradleyDeavers1980, 100.0).unwrap();
        assert!(large > small);
        assert!((conductance(ConductanceModel::Constant(5.0), 100.0).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_thermoregulation_zero_in_thermoneutral_zone() {
        // Plenty of metabolic heat: no extra cost at mild temperatures.
        let cost = thermoregulation_expenditure(8.0, 5.0, 38.0, 25.0).unwrap();
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_thermoregulation_grows_linearly_below_critical() {
        let conductance = 5.0;
        let thermoneutral = 8.0;
        let critical = 38.0 - thermoneutral * WATTS_PER_MJ_PER_DAY / conductance;
        let one_below =
            thermoregulation_expenditure(thermoneutral, conductance, 38.0, critical - 1.0).unwrap();
        let two_below =
            thermoregulation_expenditure(thermoneutral, conductance, 38.0, critical - 2.0).unwrap();
        assert!(one_below > 0.0);
        assert!((two_below - 2.0 * one_below).abs() < 1e-9);
    }
}
