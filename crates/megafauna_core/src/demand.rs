//! Per-herbivore calculation of how much forage is wanted today.

use crate::error::{Result, SimError};
use crate::foraging_limits::{
    calc_allometry, digestive_limit_illius_gordon_1992, HalfMaxIntake,
};
use megafauna_data::{
    convert_mj_to_kg_proportionally, Digestibility, DietComposer, DigestiveLimit, ForageEnergy,
    ForageEnergyContent, ForageFraction, ForageMass, ForageType, ForagingLimit, HabitatForage,
    Hft, Sex,
};
use std::sync::Arc;

/// Cap above any realistic daily intake [kgDM/ind/day], used as the
/// starting point before the limit models reduce it.
const UNCONSTRAINED_INTAKE: f64 = 1.0e4;

/// Stateful helper computing a herbivore's daily forage demand.
///
/// [`ForageDemand::init_today`] caches today's diet composition and
/// maximum intake; [`ForageDemand::demand`] may then be queried several
/// times a day (after partial feeding it returns what is still wanted),
/// and [`ForageDemand::add_eaten`] books ingested forage against the
/// remaining allowance.
#[derive(Debug, Clone)]
pub struct ForageDemand {
    hft: Arc<Hft>,
    sex: Sex,

    // Today's cached state, set by `init_today`.
    today: Option<u16>,
    available_forage: HabitatForage,
    bodymass: f64,
    diet_composition: ForageFraction,
    digestibility: Digestibility,
    energy_content: ForageEnergyContent,
    max_intake: ForageMass,
}

impl ForageDemand {
    #[must_use]
    pub fn new(hft: Arc<Hft>, sex: Sex) -> Self {
        Self {
            hft,
            sex,
            today: None,
            available_forage: HabitatForage::default(),
            bodymass: 0.0,
            diet_composition: ForageFraction::zero(),
            digestibility: Digestibility::zero(),
            energy_content: ForageEnergyContent::zero(),
            max_intake: ForageMass::zero(),
        }
    }

    /// Whether the given day has been initialized.
    pub fn is_day_initialized(&self, day: u16) -> Result<bool> {
        if day > 364 {
            return Err(SimError::invalid("day must be within [0,364]"));
        }
        Ok(self.today == Some(day))
    }

    /// Initialize foraging for a new day: compute the diet composition and
    /// cap the daily intake by the digestive and foraging limits.
    pub fn init_today(
        &mut self,
        day: u16,
        available_forage: &HabitatForage,
        energy_content: &ForageEnergyContent,
        bodymass: f64,
    ) -> Result<()> {
        if day > 364 {
            return Err(SimError::invalid("day must be within [0,364]"));
        }
        if bodymass <= 0.0 {
            return Err(SimError::invalid("body mass must be positive"));
        }
        if bodymass > self.bodymass_adult() {
            return Err(SimError::logic(
                "body mass exceeds the adult body mass of the functional type",
            ));
        }
        self.today = Some(day);
        self.available_forage = *available_forage;
        self.bodymass = bodymass;
        self.digestibility = available_forage.digestibility()?;
        self.energy_content = *energy_content;
        self.diet_composition = self.preferred_diet_composition()?;

        let mut max_intake = ForageMass::broadcast(UNCONSTRAINED_INTAKE)?;
        max_intake = max_intake.min(&self.max_foraging()?);
        max_intake = max_intake.min(&self.max_digestion()?);

        // The general functional response applies on top of all other
        // limits, for the grass component only. A zero asymptote stays
        // zero.
        if self
            .hft
            .foraging_limits
            .contains(&ForagingLimit::GeneralFunctionalResponse)
            && max_intake.get(ForageType::Grass) > 0.0
        {
            let half_max = HalfMaxIntake::new(
                self.hft.foraging_half_max_intake_density * 1000.0, // gDM/m² → kgDM/km²
                max_intake.get(ForageType::Grass),
            )?;
            max_intake.set(
                ForageType::Grass,
                half_max.intake_rate(available_forage.grass.mass)?,
            )?;
        }
        self.max_intake = max_intake;
        Ok(())
    }

    /// Register ingested forage [kgDM/ind] so that less will be demanded.
    ///
    /// Exceeding the remaining allowance by more than 0.1 % is a logic
    /// violation; smaller overshoots are clipped.
    pub fn add_eaten(&mut self, eaten_forage: &ForageMass) -> Result<()> {
        let tolerated = self.max_intake.scaled(1.001)?;
        if !(eaten_forage <= &tolerated) {
            return Err(SimError::logic(
                "eaten forage exceeds the remaining maximum intake of today",
            ));
        }
        let eaten = eaten_forage.min(&self.max_intake);
        self.max_intake = self.max_intake.checked_sub(&eaten)?;
        Ok(())
    }

    /// Today's demanded forage [kgDM/ind] for the given hunger [MJ/ind].
    ///
    /// The intake maxima are composed so that the preferred energy-wise
    /// diet ratios are retained, then reduced to the energy needs and
    /// clipped to the available forage.
    pub fn demand(&mut self, energy_needs: f64) -> Result<ForageMass> {
        if self.today.is_none() {
            return Err(SimError::logic(
                "forage demand queried before init_today()",
            ));
        }
        if energy_needs < 0.0 || !energy_needs.is_finite() {
            return Err(SimError::invalid("energy needs must be non-negative"));
        }
        // No hunger, no demands.
        if energy_needs == 0.0 {
            return Ok(ForageMass::zero());
        }

        // Express the remaining intake allowance as energy.
        let max_energy_intake = self.max_intake.to_energy(&self.energy_content);
        let max_energy_sum = max_energy_intake.sum();
        if max_energy_sum == 0.0 {
            return Ok(ForageMass::zero());
        }

        // Find the forage type whose preferred share is most constrained
        // by what can actually be ingested: the one whose preferred
        // fraction lies furthest above its share of the possible intake.
        // Scaling all intakes by that limiting ratio retains the
        // preferred energy ratios where the forage allows it.
        let mut min_fraction: f64 = 1.0;
        for ft in ForageType::ALL {
            let preferred = self.diet_composition.get(ft);
            let possible = max_energy_intake.get(ft);
            if preferred > 0.0 && possible > 0.0 {
                min_fraction = min_fraction.min(preferred * max_energy_sum / possible);
            }
        }
        let mut composed = ForageEnergy::zero();
        for ft in ForageType::ALL {
            composed.set(
                ft,
                max_energy_intake.get(ft) * min_fraction * self.diet_composition.get(ft),
            )?;
        }
        if composed.sum() == 0.0 {
            return Ok(ForageMass::zero());
        }

        // Reduce to the actual energy needs.
        let reduction = (energy_needs / composed.sum()).min(1.0);
        let demanded_energy = composed.scaled(reduction)?;
        debug_assert!(demanded_energy.sum() <= energy_needs * 1.0000001);

        // Convert back to mass and clip to what the habitat offers.
        let demanded_mass = demanded_energy.to_mass(&self.energy_content)?;
        Ok(demanded_mass.min(&self.available_forage.mass()?))
    }

    fn bodymass_adult(&self) -> f64 {
        self.hft.body_mass_adult(self.sex)
    }

    /// Energy-wise preferences for the forage types; the fractions sum
    /// to 1.
    fn preferred_diet_composition(&self) -> Result<ForageFraction> {
        let mut result = ForageFraction::zero();
        match self.hft.foraging_diet_composer {
            DietComposer::PureGrazer => result.set(ForageType::Grass, 1.0)?,
        }
        let sum = result.sum();
        if !(0.999..=1.001).contains(&sum) {
            return Err(SimError::logic(
                "diet composition fractions do not sum up to 1",
            ));
        }
        Ok(result)
    }

    /// Maximum intake [kgDM/ind/day] that could be digested today.
    fn max_digestion(&self) -> Result<ForageMass> {
        match self.hft.digestion_limit {
            DigestiveLimit::None => Ok(ForageMass::broadcast(UNCONSTRAINED_INTAKE)?),
            DigestiveLimit::Allometric => {
                let kg_total = calc_allometry(
                    &self.hft.digestion_allometric,
                    self.hft.body_mass_male,
                    self.bodymass,
                )?;
                max_intake_as_total_mass(&self.diet_composition, &self.energy_content, kg_total)
            }
            DigestiveLimit::FixedFraction => {
                let mut fraction = self.hft.digestion_fixed_fraction;
                // Juveniles digest more per unit body mass; scale the
                // fraction with the mass-specific metabolic rate, anchored
                // at male adult mass for both sexes.
                let reference = self.hft.body_mass_male;
                if self.bodymass < reference {
                    fraction =
                        fraction / reference.powf(-0.75) * self.bodymass.powf(-0.75);
                }
                max_intake_as_total_mass(
                    &self.diet_composition,
                    &self.energy_content,
                    fraction * self.bodymass,
                )
            }
            DigestiveLimit::IlliusGordon1992 => {
                let limit_mj = digestive_limit_illius_gordon_1992(
                    self.bodymass_adult(),
                    self.bodymass,
                    self.digestibility.get(ForageType::Grass),
                    &self.hft.digestion_i_g_1992_ijk,
                )?;
                let mut limit = ForageEnergy::zero();
                limit.set(ForageType::Grass, limit_mj)?;
                // Zero energy content keeps a zero intake.
                Ok(limit.to_mass(&self.energy_content)?)
            }
        }
    }

    /// Maximum harvestable intake [kgDM/ind/day] under today's foraging
    /// limits, ignoring digestion and hunger.
    fn max_foraging(&self) -> Result<ForageMass> {
        let mut result = ForageMass::broadcast(UNCONSTRAINED_INTAKE)?;
        for limit in &self.hft.foraging_limits {
            match limit {
                ForagingLimit::IlliusOConnor2000 => {
                    // Functional response with the digestive limit as
                    // asymptote; grass only. β converts gDM/m² → kgDM/km².
                    let max_mj = digestive_limit_illius_gordon_1992(
                        self.bodymass_adult(),
                        self.bodymass,
                        self.digestibility.get(ForageType::Grass),
                        &self.hft.digestion_i_g_1992_ijk,
                    )?;
                    let grass_limit_kg = if max_mj > 0.0 {
                        let half_max = HalfMaxIntake::new(
                            self.hft.foraging_half_max_intake_density * 1000.0,
                            max_mj,
                        )?;
                        // Like Pachzelt et al. (2013): the whole-habitat
                        // grass density, not the sward density.
                        let grass_limit_mj =
                            half_max.intake_rate(self.available_forage.grass.mass)?;
                        let energy = self.energy_content.get(ForageType::Grass);
                        if energy > 0.0 {
                            grass_limit_mj / energy
                        } else {
                            0.0 // no energy, no feeding
                        }
                    } else {
                        0.0
                    };
                    result.set(
                        ForageType::Grass,
                        result.get(ForageType::Grass).min(grass_limit_kg),
                    )?;
                }
                // Applied later on top of all other limits.
                ForagingLimit::GeneralFunctionalResponse => {}
            }
        }
        Ok(result)
    }
}

/// Distribute a total dry-matter allowance [kgDM/day] over the forage
/// types so that the energy-wise diet proportions are retained.
pub fn max_intake_as_total_mass(
    mj_proportions: &ForageFraction,
    mj_per_kg: &ForageEnergyContent,
    kg_total: f64,
) -> Result<ForageMass> {
    if kg_total < 0.0 {
        return Err(SimError::invalid("total intake must not be negative"));
    }
    if kg_total == 0.0 {
        return Ok(ForageMass::zero());
    }
    if !(0.999..=1.001).contains(&mj_proportions.sum()) {
        return Err(SimError::invalid(
            "diet proportions must sum up to 100 %",
        ));
    }
    let mass_proportions = convert_mj_to_kg_proportionally(mj_per_kg, mj_proportions)?;
    let proportion_sum = mass_proportions.sum();
    if proportion_sum == 0.0 {
        return Ok(ForageMass::zero());
    }
    let mut result = ForageMass::zero();
    for ft in ForageType::ALL {
        result.set(ft, kg_total * mass_proportions.get(ft) / proportion_sum)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forage_energy::net_energy_content;
    use megafauna_data::{DigestionType, GrassForage, NetEnergyModel};

    fn test_hft() -> Arc<Hft> {
        Arc::new(Hft {
            name: "grazer".to_string(),
            ..Hft::default()
        })
    }

    fn habitat_forage(mass: f64, digestibility: f64) -> HabitatForage {
        HabitatForage {
            grass: GrassForage {
                mass,
                digestibility,
                fpc: 0.5,
                nitrogen_content: 0.02,
            },
        }
    }

    fn energy_content(digestibility: f64) -> ForageEnergyContent {
        net_energy_content(
            &Digestibility::broadcast(digestibility).unwrap(),
            NetEnergyModel::Default,
            DigestionType::Ruminant,
        )
        .unwrap()
    }

    fn initialized_demand(available_mass: f64) -> ForageDemand {
        let mut demand = ForageDemand::new(test_hft(), Sex::Female);
        demand
            .init_today(
                10,
                &habitat_forage(available_mass, 0.6),
                &energy_content(0.6),
                90.0,
            )
            .unwrap();
        demand
    }

    #[test]
    fn test_demand_requires_init() {
        let mut demand = ForageDemand::new(test_hft(), Sex::Male);
        assert!(demand.demand(10.0).is_err());
        assert!(!demand.is_day_initialized(10).unwrap());
    }

    #[test]
    fn test_init_validation() {
        let mut demand = ForageDemand::new(test_hft(), Sex::Male);
        let forage = habitat_forage(1000.0, 0.5);
        let content = energy_content(0.5);
        assert!(demand.init_today(365, &forage, &content, 90.0).is_err());
        assert!(demand.init_today(10, &forage, &content, 0.0).is_err());
        // Above adult mass is a contract violation.
        assert!(demand.init_today(10, &forage, &content, 101.0).is_err());
        assert!(demand.init_today(10, &forage, &content, 90.0).is_ok());
        assert!(demand.is_day_initialized(10).unwrap());
        assert!(!demand.is_day_initialized(11).unwrap());
    }

    #[test]
    fn test_no_hunger_no_demand() {
        let mut demand = initialized_demand(1.0e6);
        assert_eq!(demand.demand(0.0).unwrap().sum(), 0.0);
    }

    #[test]
    fn test_demand_meets_energy_needs() {
        let mut demand = initialized_demand(1.0e6);
        let needs = 1.0; // small enough that no limit binds
        let mass = demand.demand(needs).unwrap();
        let energy = mass.to_energy(&energy_content(0.6)).sum();
        assert!((energy - needs).abs() / needs < 1e-6);
    }

    #[test]
    fn test_demand_clipped_to_available() {
        let mut demand = initialized_demand(0.5);
        let mass = demand.demand(1.0e4).unwrap();
        assert!(mass.get(ForageType::Grass) <= 0.5);
    }

    #[test]
    fn test_demand_capped_by_digestive_limit() {
        let mut demand = initialized_demand(1.0e9);
        let limit_mj =
            digestive_limit_illius_gordon_1992(90.0, 90.0, 0.6, &test_hft().digestion_i_g_1992_ijk)
                .unwrap();
        let mass = demand.demand(1.0e6).unwrap();
        let energy = mass.to_energy(&energy_content(0.6)).sum();
        // The functional response at huge grass densities approaches the
        // digestive limit.
        assert!(energy <= limit_mj * 1.0001);
        assert!(energy > limit_mj * 0.99);
    }

    #[test]
    fn test_add_eaten_reduces_future_demand() {
        let mut demand = initialized_demand(1.0e9);
        let first = demand.demand(1.0e6).unwrap();
        demand.add_eaten(&first).unwrap();
        let second = demand.demand(1.0e6).unwrap();
        assert!(second.sum() < first.sum() * 0.01);
    }

    #[test]
    fn test_add_eaten_rejects_overshoot() {
        let mut demand = initialized_demand(1.0e9);
        let allowed = demand.demand(1.0e6).unwrap();
        let excessive = allowed.scaled(1.1).unwrap();
        assert!(demand.add_eaten(&excessive).is_err());
    }

    #[test]
    fn test_zero_digestibility_zero_intake() {
        let mut demand = ForageDemand::new(test_hft(), Sex::Female);
        demand
            .init_today(
                10,
                &habitat_forage(1.0e6, 0.0),
                &energy_content(0.0),
                90.0,
            )
            .unwrap();
        assert_eq!(demand.demand(100.0).unwrap().sum(), 0.0);
    }

    #[test]
    fn test_allometric_limit_scales_with_mass() {
        let hft = Arc::new(Hft {
            name: "grazer".to_string(),
            digestion_limit: DigestiveLimit::Allometric,
            digestion_allometric: megafauna_data::GivenPointAllometry {
                exponent: 0.75,
                value_male_adult: 4.0,
            },
            foraging_limits: vec![],
            ..Hft::default()
        });
        let content = energy_content(0.6);
        let forage = habitat_forage(1.0e9, 0.6);

        // At male adult mass the limit passes through the given point.
        let mut demand = ForageDemand::new(Arc::clone(&hft), Sex::Male);
        demand.init_today(10, &forage, &content, 100.0).unwrap();
        let at_adult = demand.demand(1.0e6).unwrap().sum();
        assert!((at_adult - 4.0).abs() < 1e-9);

        // Half the body mass allows less than the full allowance.
        demand.init_today(11, &forage, &content, 50.0).unwrap();
        let at_half = demand.demand(1.0e6).unwrap().sum();
        assert!((at_half - 4.0 * 0.5f64.powf(0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_fraction_juveniles_scale_on_male_adult_mass() {
        let hft = Arc::new(Hft {
            name: "grazer".to_string(),
            digestion_limit: DigestiveLimit::FixedFraction,
            digestion_fixed_fraction: 0.02,
            foraging_limits: vec![],
            ..Hft::default()
        });
        let content = energy_content(0.6);
        let forage = habitat_forage(1.0e9, 0.6);

        // An animal at male adult mass eats the plain fraction.
        let mut demand = ForageDemand::new(Arc::clone(&hft), Sex::Male);
        demand.init_today(10, &forage, &content, 100.0).unwrap();
        let adult_intake = demand.demand(1.0e6).unwrap().sum();
        assert!((adult_intake - 0.02 * 100.0).abs() < 1e-9);

        // A juvenile's fraction is scaled by the mass-specific metabolic
        // ratio, anchored at the male adult mass for both sexes.
        let juvenile_mass: f64 = 25.0;
        let expected_fraction = 0.02 / 100.0f64.powf(-0.75) * juvenile_mass.powf(-0.75);
        for sex in [Sex::Male, Sex::Female] {
            let mut demand = ForageDemand::new(Arc::clone(&hft), sex);
            demand
                .init_today(10, &forage, &content, juvenile_mass)
                .unwrap();
            let juvenile_intake = demand.demand(1.0e6).unwrap().sum();
            assert!((juvenile_intake - expected_fraction * juvenile_mass).abs() < 1e-9);
        }
    }

    #[test]
    fn test_general_functional_response_applies_on_top() {
        let base = Hft {
            name: "grazer".to_string(),
            digestion_limit: DigestiveLimit::FixedFraction,
            digestion_fixed_fraction: 0.02,
            foraging_limits: vec![],
            ..Hft::default()
        };
        let content = energy_content(0.6);
        // Grass exactly at the half-saturation density (40 g/m²).
        let half_max_mass = base.foraging_half_max_intake_density * 1000.0;
        let forage = habitat_forage(half_max_mass, 0.6);

        let mut unconstrained = ForageDemand::new(Arc::new(base.clone()), Sex::Male);
        unconstrained
            .init_today(10, &forage, &content, 100.0)
            .unwrap();
        let plain = unconstrained.demand(1.0e6).unwrap().sum();

        let with_response = Hft {
            foraging_limits: vec![ForagingLimit::GeneralFunctionalResponse],
            ..base
        };
        let mut constrained = ForageDemand::new(Arc::new(with_response), Sex::Male);
        constrained
            .init_today(10, &forage, &content, 100.0)
            .unwrap();
        let halved = constrained.demand(1.0e6).unwrap().sum();

        // At half saturation the response halves the fixed-fraction cap.
        assert!((halved - plain / 2.0).abs() / plain < 1e-9);
    }

    #[test]
    fn test_general_functional_response_keeps_zero_asymptote() {
        let hft = Arc::new(Hft {
            name: "grazer".to_string(),
            foraging_limits: vec![ForagingLimit::GeneralFunctionalResponse],
            ..Hft::default()
        });
        // Zero digestibility: the digestive limit is already zero, and
        // the functional response must leave it at zero.
        let mut demand = ForageDemand::new(hft, Sex::Male);
        demand
            .init_today(10, &habitat_forage(1.0e6, 0.0), &energy_content(0.0), 100.0)
            .unwrap();
        assert_eq!(demand.demand(1.0e6).unwrap().sum(), 0.0);
    }

    #[test]
    fn test_max_intake_as_total_mass() {
        let proportions = ForageFraction::broadcast(1.0).unwrap();
        let content = ForageEnergyContent::broadcast(5.0).unwrap();
        let mass = max_intake_as_total_mass(&proportions, &content, 10.0).unwrap();
        assert!((mass.sum() - 10.0).abs() < 1e-9);
        assert!(max_intake_as_total_mass(&proportions, &content, -1.0).is_err());
        assert_eq!(
            max_intake_as_total_mass(&proportions, &content, 0.0)
                .unwrap()
                .sum(),
            0.0
        );
    }
}
