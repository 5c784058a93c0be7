//! Cohort populations: one container of herbivore cohorts per
//! functional type.

use crate::error::{Result, SimError};
use crate::herbivore::HerbivoreCohort;
use megafauna_data::{ForageEnergyContent, Hft, Sex};
use std::sync::Arc;

/// All cohorts of one herbivore functional type in one habitat.
///
/// At any moment there is at most one living cohort per (age-year, sex)
/// pair: newborns of the same year merge into the existing newborn
/// cohort.
#[derive(Debug, Clone)]
pub struct CohortPopulation {
    hft: Arc<Hft>,
    forage_gross_energy: ForageEnergyContent,
    cohorts: Vec<HerbivoreCohort>,
}

impl CohortPopulation {
    #[must_use]
    pub fn new(hft: Arc<Hft>, forage_gross_energy: ForageEnergyContent) -> Self {
        Self {
            hft,
            forage_gross_energy,
            cohorts: Vec::new(),
        }
    }

    #[must_use]
    pub fn hft(&self) -> &Arc<Hft> {
        &self.hft
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    /// All cohorts, including dead ones.
    #[must_use]
    pub fn cohorts(&self) -> &[HerbivoreCohort] {
        &self.cohorts
    }

    /// Mutable access to all cohorts, including dead ones.
    #[must_use]
    pub fn cohorts_mut(&mut self) -> &mut [HerbivoreCohort] {
        &mut self.cohorts
    }

    /// Summed individual density [ind/km²] of all living cohorts.
    #[must_use]
    pub fn ind_per_km2(&self) -> f64 {
        self.cohorts.iter().map(HerbivoreCohort::ind_per_km2).sum()
    }

    /// Summed mass density [kg/km²] of all living cohorts.
    #[must_use]
    pub fn kg_per_km2(&self) -> f64 {
        self.cohorts.iter().map(HerbivoreCohort::kg_per_km2).sum()
    }

    /// Create a set of new cohorts for a previously empty population.
    ///
    /// One male and one female cohort is created for each age year in the
    /// HFT's establishment age range; their densities sum up to the
    /// establishment density, and all start with full fat reserves.
    pub fn establish(&mut self) -> Result<()> {
        if !self.cohorts.is_empty() {
            return Err(SimError::logic(
                "trying to establish into a non-empty population",
            ));
        }
        if self.hft.establishment_density == 0.0 {
            return Ok(());
        }
        let (first_age, last_age) = self.hft.establishment_age_range;
        let cohort_count = 2 * (last_age - first_age + 1);
        let cohort_density = self.hft.establishment_density / cohort_count as f64;
        for age_years in first_age..=last_age {
            for sex in [Sex::Male, Sex::Female] {
                self.cohorts.push(HerbivoreCohort::with_age(
                    Arc::clone(&self.hft),
                    sex,
                    age_years * 365,
                    self.hft.establishment_body_condition,
                    cohort_density,
                    self.forage_gross_energy,
                )?);
            }
        }
        Ok(())
    }

    /// Add the day's newborn animals [ind/km²], split evenly by sex.
    ///
    /// Newborns join an existing age-zero cohort of their sex (keeping
    /// that cohort's age in days) or found a new one.
    pub fn create_offspring(&mut self, ind_per_km2: f64) -> Result<()> {
        if ind_per_km2 < 0.0 || !ind_per_km2.is_finite() {
            return Err(SimError::invalid(
                "offspring density must be non-negative and finite",
            ));
        }
        if ind_per_km2 == 0.0 {
            return Ok(());
        }
        for sex in [Sex::Male, Sex::Female] {
            self.create_offspring_by_sex(sex, ind_per_km2 / 2.0)?;
        }
        Ok(())
    }

    fn create_offspring_by_sex(&mut self, sex: Sex, ind_per_km2: f64) -> Result<()> {
        let newborn = HerbivoreCohort::newborn(
            Arc::clone(&self.hft),
            sex,
            ind_per_km2,
            self.forage_gross_energy,
        )?;
        match self.find_cohort_mut(0, sex) {
            Some(existing) => existing.merge(newborn)?,
            None => self.cohorts.push(newborn),
        }
        Ok(())
    }

    fn find_cohort_mut(&mut self, age_year_class: u32, sex: Sex) -> Option<&mut HerbivoreCohort> {
        self.cohorts
            .iter_mut()
            .find(|cohort| cohort.age_year_class() == age_year_class && cohort.sex() == sex)
    }

    /// Mark every cohort dead.
    pub fn kill_all(&mut self) {
        for cohort in &mut self.cohorts {
            cohort.kill();
        }
    }

    /// Kill the whole population if its total density has dropped below
    /// the minimum viable density.
    pub fn kill_nonviable(&mut self) {
        let minimum =
            self.hft.mortality_minimum_density_threshold * self.hft.establishment_density;
        if self.ind_per_km2() < minimum {
            self.kill_all();
        }
    }

    /// Remove dead cohorts. The caller is responsible for harvesting any
    /// residual state (e.g. body nitrogen) beforehand.
    pub fn purge_of_dead(&mut self) {
        self.cohorts.retain(|cohort| !cohort.is_dead());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megafauna_data::Hft;

    fn gross_energy() -> ForageEnergyContent {
        ForageEnergyContent::broadcast(19.0).unwrap()
    }

    fn population(hft: Hft) -> CohortPopulation {
        CohortPopulation::new(Arc::new(hft), gross_energy())
    }

    fn test_hft() -> Hft {
        Hft {
            name: "grazer".to_string(),
            establishment_density: 10.0,
            ..Hft::default()
        }
    }

    #[test]
    fn test_establish_single_age() {
        let mut pop = population(Hft {
            establishment_age_range: (4, 4),
            ..test_hft()
        });
        pop.establish().unwrap();
        // One male and one female cohort.
        assert_eq!(pop.cohorts().len(), 2);
        assert!((pop.ind_per_km2() - 10.0).abs() < 1e-9);
        for cohort in pop.cohorts() {
            assert_eq!(cohort.age_year_class(), 4);
            assert!((cohort.body_condition() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_establish_age_range() {
        let mut pop = population(Hft {
            establishment_age_range: (3, 6),
            ..test_hft()
        });
        pop.establish().unwrap();
        assert_eq!(pop.cohorts().len(), 8);
        assert!((pop.ind_per_km2() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_establish_twice_fails() {
        let mut pop = population(test_hft());
        pop.establish().unwrap();
        assert!(pop.establish().is_err());
    }

    #[test]
    fn test_create_offspring_splits_by_sex() {
        let mut pop = population(test_hft());
        pop.create_offspring(4.0).unwrap();
        assert_eq!(pop.cohorts().len(), 2);
        for cohort in pop.cohorts() {
            assert_eq!(cohort.age_year_class(), 0);
            assert!((cohort.ind_per_km2() - 2.0).abs() < 1e-12);
        }
        assert!(pop.create_offspring(-1.0).is_err());
    }

    #[test]
    fn test_offspring_merge_into_existing_newborns() {
        let mut pop = population(test_hft());
        pop.create_offspring(4.0).unwrap();
        pop.create_offspring(6.0).unwrap();
        // Still one cohort per sex; densities added up.
        assert_eq!(pop.cohorts().len(), 2);
        assert!((pop.ind_per_km2() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_offspring_changes_nothing() {
        let mut pop = population(test_hft());
        pop.create_offspring(0.0).unwrap();
        assert!(pop.is_empty());
    }

    #[test]
    fn test_kill_nonviable_below_threshold() {
        // Threshold: 5 % of 10 ind/km² = 0.5 ind/km².
        let mut pop = population(test_hft());
        pop.create_offspring(0.4).unwrap();
        assert!(pop.ind_per_km2() > 0.0);
        pop.kill_nonviable();
        assert_eq!(pop.ind_per_km2(), 0.0);
        assert!(!pop.is_empty());
        pop.purge_of_dead();
        assert!(pop.is_empty());
    }

    #[test]
    fn test_kill_nonviable_keeps_viable() {
        let mut pop = population(test_hft());
        pop.establish().unwrap();
        pop.kill_nonviable();
        assert!((pop.ind_per_km2() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_purge_keeps_living() {
        let mut pop = population(test_hft());
        pop.establish().unwrap();
        let count_before = pop.cohorts().len();
        pop.cohorts_mut()[0].kill();
        pop.purge_of_dead();
        assert_eq!(pop.cohorts().len(), count_before - 1);
    }
}
