//! Property tests for the checked forage-value arithmetic.

use megafauna_data::{
    ForageEnergyContent, ForageFraction, ForageMass, ForageType,
};
use proptest::prelude::*;

fn mass_value() -> impl Strategy<Value = f64> {
    0.0..1.0e9f64
}

fn fraction_value() -> impl Strategy<Value = f64> {
    0.0..=1.0f64
}

proptest! {
    #[test]
    fn addition_never_leaves_the_constraint(a in mass_value(), b in mass_value()) {
        let a = ForageMass::broadcast(a).unwrap();
        let b = ForageMass::broadcast(b).unwrap();
        let sum = a.checked_add(&b).unwrap();
        prop_assert!(sum.get(ForageType::Grass) >= 0.0);
    }

    #[test]
    fn subtraction_fails_or_stays_non_negative(a in mass_value(), b in mass_value()) {
        let a = ForageMass::broadcast(a).unwrap();
        let b = ForageMass::broadcast(b).unwrap();
        match a.checked_sub(&b) {
            Ok(diff) => prop_assert!(diff.get(ForageType::Grass) >= 0.0),
            Err(_) => prop_assert!(b.get(ForageType::Grass) > a.get(ForageType::Grass)),
        }
    }

    #[test]
    fn merge_lies_between_the_inputs(
        a in fraction_value(),
        b in fraction_value(),
        w1 in 0.001..1000.0f64,
        w2 in 0.001..1000.0f64,
    ) {
        let lo = a.min(b);
        let hi = a.max(b);
        let a = ForageFraction::broadcast(a).unwrap();
        let b = ForageFraction::broadcast(b).unwrap();
        let merged = a.merge(&b, w1, w2).unwrap().get(ForageType::Grass);
        prop_assert!(merged >= lo - 1e-12 && merged <= hi + 1e-12);
    }

    #[test]
    fn energy_conversion_round_trips(mass in 0.001..1.0e6f64, content in 0.001..100.0f64) {
        let content = ForageEnergyContent::broadcast(content).unwrap();
        let mass = ForageMass::broadcast(mass).unwrap();
        let round_tripped = mass.to_energy(&content).to_mass(&content).unwrap();
        let relative_error = (round_tripped.get(ForageType::Grass)
            - mass.get(ForageType::Grass)).abs() / mass.get(ForageType::Grass);
        prop_assert!(relative_error < 1e-9);
    }

    #[test]
    fn proportions_sum_to_one_or_zero(mass in 0.0..1.0e9f64) {
        let mass = ForageMass::broadcast(mass).unwrap();
        let proportions = mass.to_proportions().unwrap();
        let sum = proportions.sum();
        prop_assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-12);
    }
}
