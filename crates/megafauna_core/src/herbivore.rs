//! Herbivore cohorts: life-cycle state and the per-day update.
//!
//! A cohort is an age-class of same-sex herbivores of one functional
//! type; all state variables are means over its individuals.

use crate::demand::ForageDemand;
use crate::energy_budget::{
    FatmassEnergyBudget, DEFAULT_ANABOLISM_COEFFICIENT, DEFAULT_CATABOLISM_COEFFICIENT,
};
use crate::error::{Result, SimError};
use crate::expenditure::{
    conductance, expenditure_taylor_1981, expenditure_zhu_et_al_2018,
    thermoregulation_expenditure,
};
use crate::forage_energy::net_energy_content;
use crate::mortality::{
    GetBackgroundMortality, GetSimpleLifespanMortality, GetStarvationIlliusOConnor2000,
    GetStarvationMortalityThreshold,
};
use crate::reproduction::{BreedingSeason, Reproduction};
use megafauna_data::{
    BodyConditionSource, Digestibility, ExpenditureComponent, ForageEnergyContent, ForageMass,
    HabitatEnvironment, HabitatForage, HerbivoreData, Hft, MortalityFactor, ReproductionModel,
    Sex,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// Nitrogen bound in live body tissue [kgN per kg body mass].
const TISSUE_NITROGEN_PER_KG: f64 = 0.03;

/// Rolling mean over a fixed-length window of daily values.
#[derive(Debug, Clone)]
struct PeriodAverage {
    values: VecDeque<f64>,
    capacity: usize,
}

impl PeriodAverage {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    fn add_value(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }
}

/// Nitrogen bookkeeping for one cohort [kgN/km²].
///
/// Ingested nitrogen passes the gut within a day and joins the excreta
/// pool, except for what is bound in growing body tissue. Shrinking body
/// mass (mortality) releases carcass nitrogen back into the excreta pool,
/// so that the total nitrogen in the simulation unit is conserved.
#[derive(Debug, Clone, Default, PartialEq)]
struct NitrogenPool {
    digesting: f64,
    excreta: f64,
    tissue: f64,
}

impl NitrogenPool {
    fn ingest(&mut self, kg_per_km2: f64) {
        debug_assert!(kg_per_km2 >= 0.0);
        self.digesting += kg_per_km2;
    }

    /// Daily update with the cohort's current body mass density.
    fn digest_today(&mut self, bodymass_kg_per_km2: f64) {
        // Yesterday's ingesta have passed the gut by now.
        self.excreta += self.digesting;
        self.digesting = 0.0;

        let tissue_target = TISSUE_NITROGEN_PER_KG * bodymass_kg_per_km2;
        if tissue_target >= self.tissue {
            // Growth binds nitrogen, as far as the pools can supply it.
            let bound = (tissue_target - self.tissue).min(self.excreta);
            self.excreta -= bound;
            self.tissue += bound;
        } else {
            // Lost body mass returns carcass nitrogen.
            self.excreta += self.tissue - tissue_target;
            self.tissue = tissue_target;
        }
    }

    fn reset_excreta(&mut self) -> f64 {
        std::mem::take(&mut self.excreta)
    }

    fn take_all(&mut self) -> f64 {
        let total = self.digesting + self.excreta + self.tissue;
        *self = Self::default();
        total
    }
}

/// An age-class of same-sex herbivores of one functional type.
///
/// Calculations are generally performed per individual; the cohort scales
/// them with its individual density. A cohort is dead iff its density is
/// zero.
#[derive(Debug, Clone)]
pub struct HerbivoreCohort {
    // Constants.
    hft: Arc<Hft>,
    sex: Sex,
    forage_gross_energy: ForageEnergyContent,

    // State.
    age_days: u32,
    ind_per_km2: f64,
    energy_budget: FatmassEnergyBudget,
    environment: HabitatEnvironment,
    today: Option<u16>,
    body_condition_gestation: PeriodAverage,
    nitrogen: NitrogenPool,
    demand: ForageDemand,
    current_output: HerbivoreData,
}

impl HerbivoreCohort {
    /// Establishment constructor: a cohort of the given age [days] with
    /// fat reserves at `body_condition` (fraction of the maximum).
    pub fn with_age(
        hft: Arc<Hft>,
        sex: Sex,
        age_days: u32,
        body_condition: f64,
        ind_per_km2: f64,
        forage_gross_energy: ForageEnergyContent,
    ) -> Result<Self> {
        if age_days == 0 {
            return Err(SimError::invalid(
                "establishment age must be at least one day; use newborn() for births",
            ));
        }
        if !(0.0..=1.0).contains(&body_condition) {
            return Err(SimError::invalid("body condition must be within [0,1]"));
        }
        let max_fatmass = max_fatmass_at(&hft, sex, age_days);
        Self::build(
            hft,
            sex,
            age_days,
            body_condition * max_fatmass,
            max_fatmass,
            ind_per_km2,
            forage_gross_energy,
        )
    }

    /// Birth constructor: age zero, fat reserves at the birth body fat of
    /// the functional type.
    pub fn newborn(
        hft: Arc<Hft>,
        sex: Sex,
        ind_per_km2: f64,
        forage_gross_energy: ForageEnergyContent,
    ) -> Result<Self> {
        let birth_fatmass = hft.body_mass_birth * hft.body_mass_empty * hft.body_fat_birth;
        let max_fatmass = max_fatmass_at(&hft, sex, 0);
        Self::build(
            hft,
            sex,
            0,
            birth_fatmass,
            max_fatmass,
            ind_per_km2,
            forage_gross_energy,
        )
    }

    fn build(
        hft: Arc<Hft>,
        sex: Sex,
        age_days: u32,
        fatmass: f64,
        max_fatmass: f64,
        ind_per_km2: f64,
        forage_gross_energy: ForageEnergyContent,
    ) -> Result<Self> {
        if !(ind_per_km2 >= 0.0 && ind_per_km2.is_finite()) {
            return Err(SimError::invalid(
                "individual density must be non-negative and finite",
            ));
        }
        let energy_budget = FatmassEnergyBudget::new(
            fatmass,
            max_fatmass,
            DEFAULT_ANABOLISM_COEFFICIENT,
            DEFAULT_CATABOLISM_COEFFICIENT,
        )?;
        let demand = ForageDemand::new(Arc::clone(&hft), sex);
        let gestation_window = hft.life_history_gestation_days.max(1) as usize;
        Ok(Self {
            hft,
            sex,
            forage_gross_energy,
            age_days,
            ind_per_km2,
            energy_budget,
            environment: HabitatEnvironment::default(),
            today: None,
            body_condition_gestation: PeriodAverage::new(gestation_window),
            nitrogen: NitrogenPool::default(),
            demand,
            current_output: HerbivoreData::default(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors

    #[must_use]
    pub fn hft(&self) -> &Arc<Hft> {
        &self.hft
    }

    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[must_use]
    pub fn age_days(&self) -> u32 {
        self.age_days
    }

    #[must_use]
    pub fn age_years(&self) -> f64 {
        self.age_days as f64 / 365.0
    }

    /// Year of life (0 = first year), used for cohort identity.
    #[must_use]
    pub fn age_year_class(&self) -> u32 {
        self.age_days / 365
    }

    #[must_use]
    pub fn ind_per_km2(&self) -> f64 {
        self.ind_per_km2
    }

    /// Herbivore biomass density [kg/km²].
    #[must_use]
    pub fn kg_per_km2(&self) -> f64 {
        self.bodymass() * self.ind_per_km2
    }

    /// A cohort is dead iff its individual density is zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.ind_per_km2 <= 0.0
    }

    /// Mark the cohort as dead. Remaining body nitrogen stays harvestable
    /// through [`Self::take_nitrogen_excreta`] until the cohort is purged.
    pub fn kill(&mut self) {
        self.ind_per_km2 = 0.0;
    }

    /// Mass of body tissue without fat, ingesta, blood etc. [kg/ind].
    ///
    /// Interpolates linearly between the neonate and the adult structural
    /// mass up to physical maturity.
    #[must_use]
    pub fn structural_mass(&self) -> f64 {
        structural_mass_at(&self.hft, self.sex, self.age_days)
    }

    /// Current live weight including fat, ingesta, blood etc. [kg/ind].
    #[must_use]
    pub fn bodymass(&self) -> f64 {
        (self.structural_mass() + self.fatmass()) / self.hft.body_mass_empty
    }

    /// Live weight at physical maturity [kg/ind] (the HFT parameter mass).
    #[must_use]
    pub fn bodymass_adult(&self) -> f64 {
        self.hft.body_mass_adult(self.sex)
    }

    /// Current fat mass (pure lipids) [kg/ind].
    #[must_use]
    pub fn fatmass(&self) -> f64 {
        self.energy_budget.fatmass()
    }

    /// Physiological maximum fat mass [kg/ind] at the current age.
    #[must_use]
    pub fn max_fatmass(&self) -> f64 {
        max_fatmass_at(&self.hft, self.sex, self.age_days)
    }

    /// Proportional body fat in the empty body.
    #[must_use]
    pub fn body_fat(&self) -> f64 {
        let empty_body = self.structural_mass() + self.fatmass();
        if empty_body > 0.0 {
            self.fatmass() / empty_body
        } else {
            0.0
        }
    }

    /// Fat reserves as a fraction of the physiological maximum.
    #[must_use]
    pub fn body_condition(&self) -> f64 {
        (self.energy_budget.fatmass() / self.energy_budget.max_fatmass()).clamp(0.0, 1.0)
    }

    /// Read access to the energy budget.
    #[must_use]
    pub fn energy_budget(&self) -> &FatmassEnergyBudget {
        &self.energy_budget
    }

    /// Current day's output record.
    #[must_use]
    pub fn todays_output(&self) -> &HerbivoreData {
        &self.current_output
    }

    // ------------------------------------------------------------------
    // Daily simulation

    /// Simulate daily events: settle yesterday's energy deficit, grow,
    /// spend energy, age, reproduce, die. Returns today's offspring
    /// [ind/km²], to be collected by the population.
    ///
    /// Must be called before [`Self::get_forage_demands`]; calling it on a
    /// dead cohort is a logic violation.
    pub fn simulate_day(
        &mut self,
        day: u16,
        environment: &HabitatEnvironment,
    ) -> Result<f64> {
        if day > 364 {
            return Err(SimError::invalid("day must be within [0,364]"));
        }
        if self.is_dead() {
            return Err(SimError::logic("dead cohort instructed to simulate"));
        }
        self.environment = *environment;
        self.today = Some(day);

        // Energy needs left unmet by yesterday's feeding burn fat now, so
        // that today's mortality and reproduction see the true reserves.
        self.energy_budget.catabolize_fat();

        // Growth raises the structural mass and with it the fat capacity.
        let max_gain = if self.hft.body_fat_maximum_daily_gain > 0.0 {
            self.hft.body_fat_maximum_daily_gain * self.bodymass()
        } else {
            0.0
        };
        self.energy_budget
            .set_max_fatmass(self.max_fatmass(), max_gain)?;

        let expenditure = self.todays_expenditure()?;
        self.energy_budget.add_energy_needs(expenditure)?;

        self.age_days += 1;

        if self.sex == Sex::Female {
            self.body_condition_gestation.add_value(self.body_condition());
        }
        let offspring_per_ind = self.todays_offspring_proportion(day)?;
        let offspring = offspring_per_ind * self.ind_per_km2;

        let mortality = self.apply_mortality_factors_today()?;

        self.nitrogen.digest_today(self.kg_per_km2());

        self.current_output = HerbivoreData {
            age_years: self.age_years(),
            body_fat: self.body_fat(),
            ind_per_km2: self.ind_per_km2,
            kg_per_km2: self.kg_per_km2(),
            expenditure,
            offspring,
            mortality,
            ..HerbivoreData::default()
        };

        Ok(offspring)
    }

    /// The forage the cohort would like to eat today [kgDM/km²], not
    /// exceeding the available forage.
    ///
    /// May be called multiple times a day; after partial feeding it
    /// returns what is still wanted.
    pub fn get_forage_demands(&mut self, available_forage: &HabitatForage) -> Result<ForageMass> {
        if self.is_dead() {
            return Err(SimError::logic("dead cohort asked for forage demands"));
        }
        let day = self.today.ok_or_else(|| {
            SimError::logic("get_forage_demands() called before simulate_day()")
        })?;
        if !self.demand.is_day_initialized(day)? {
            let digestibility = available_forage.digestibility()?;
            let energy_content = self.net_energy_content(&digestibility)?;
            // Gut capacity does not grow beyond the adult parameter mass,
            // no matter how fat the animal is.
            let foraging_mass = self.bodymass().min(self.bodymass_adult());
            self.demand
                .init_today(day, available_forage, &energy_content, foraging_mass)?;
        }
        // Hunger covers today's unmet needs plus whatever fat build-up is
        // still allowed.
        let hunger =
            self.energy_budget.energy_needs() + self.energy_budget.max_anabolism_per_day();
        let demand_per_ind = self.demand.demand(hunger)?;
        Ok(demand_per_ind.scaled(self.ind_per_km2)?)
    }

    /// Feed the cohort dry-matter forage [kgDM/km²] with the given
    /// digestibility and nitrogen content [kgN/km²].
    ///
    /// The mass must not exceed the intake maxima established by
    /// [`Self::get_forage_demands`].
    pub fn eat(
        &mut self,
        forage_kg_per_km2: &ForageMass,
        digestibility: &Digestibility,
        nitrogen_kg_per_km2: &ForageMass,
    ) -> Result<()> {
        if self.is_dead() {
            return Err(SimError::logic("dead cohort instructed to eat"));
        }
        let day = self
            .today
            .ok_or_else(|| SimError::logic("eat() called before simulate_day()"))?;
        if !self.demand.is_day_initialized(day)? {
            return Err(SimError::logic("eat() called before get_forage_demands()"));
        }

        let per_ind = forage_kg_per_km2.scaled(1.0 / self.ind_per_km2)?;
        self.demand.add_eaten(&per_ind)?;

        let energy_content = self.net_energy_content(digestibility)?;
        let energy_per_ind = per_ind.to_energy(&energy_content);
        self.energy_budget.metabolize_energy(energy_per_ind.sum())?;

        self.nitrogen.ingest(nitrogen_kg_per_km2.sum());

        let out = &mut self.current_output;
        out.eaten_forage_per_ind = out.eaten_forage_per_ind.checked_add(&per_ind)?;
        out.energy_intake_per_ind = out.energy_intake_per_ind.checked_add(&energy_per_ind)?;
        out.eaten_nitrogen_per_km2 += nitrogen_kg_per_km2.sum();
        Ok(())
    }

    /// Excreted nitrogen [kgN/km²] accumulated since the last call; for a
    /// dead cohort all remaining body nitrogen is returned. Resets the
    /// pools.
    pub fn take_nitrogen_excreta(&mut self) -> f64 {
        if self.is_dead() {
            self.nitrogen.take_all()
        } else {
            self.nitrogen.reset_excreta()
        }
    }

    // ------------------------------------------------------------------
    // Merging

    /// Whether two cohorts are in the same year of life.
    #[must_use]
    pub fn is_same_age_class(&self, other: &HerbivoreCohort) -> bool {
        self.age_year_class() == other.age_year_class()
    }

    /// Whether the constant configuration matches (HFT identity, sex and
    /// gross-energy setup).
    #[must_use]
    pub fn constant_members_match(&self, other: &HerbivoreCohort) -> bool {
        Arc::ptr_eq(&self.hft, &other.hft)
            && self.sex == other.sex
            && self.forage_gross_energy == other.forage_gross_energy
    }

    /// Merge another cohort into this one, consuming it.
    ///
    /// State variables are averaged, weighted by individual density; the
    /// densities are summed. The donor's precise age in days is lost.
    pub fn merge(&mut self, other: HerbivoreCohort) -> Result<()> {
        if !self.is_same_age_class(&other) {
            return Err(SimError::logic(
                "cohorts of different age classes cannot merge",
            ));
        }
        if !self.constant_members_match(&other) {
            return Err(SimError::logic(
                "cohorts with different constant configuration cannot merge",
            ));
        }
        self.energy_budget
            .merge(&other.energy_budget, self.ind_per_km2, other.ind_per_km2);
        self.nitrogen.digesting += other.nitrogen.digesting;
        self.nitrogen.excreta += other.nitrogen.excreta;
        self.nitrogen.tissue += other.nitrogen.tissue;
        self.ind_per_km2 += other.ind_per_km2;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals

    fn net_energy_content(&self, digestibility: &Digestibility) -> Result<ForageEnergyContent> {
        net_energy_content(
            digestibility,
            self.hft.digestion_net_energy_model,
            self.hft.digestion_type,
        )
    }

    /// Today's energy expenditure [MJ/ind/day]: the sum of all enabled
    /// components.
    fn todays_expenditure(&self) -> Result<f64> {
        let bodymass = self.bodymass();
        let mut thermoneutral = 0.0;
        for component in &self.hft.expenditure_components {
            thermoneutral += match component {
                ExpenditureComponent::Taylor1981 => {
                    expenditure_taylor_1981(bodymass, self.bodymass_adult())?
                }
                ExpenditureComponent::Zhu2018 => {
                    expenditure_zhu_et_al_2018(bodymass, self.environment.air_temperature)?
                }
                ExpenditureComponent::Thermoregulation => 0.0,
            };
        }
        let mut total = thermoneutral;
        if self
            .hft
            .expenditure_components
            .contains(&ExpenditureComponent::Thermoregulation)
        {
            let conductance = conductance(self.hft.thermoregulation_conductance, bodymass)?;
            total += thermoregulation_expenditure(
                thermoneutral,
                conductance,
                self.hft.thermoregulation_core_temperature,
                self.environment.air_temperature,
            )?;
        }
        Ok(total)
    }

    /// Offspring per individual for today: zero for males and for females
    /// below sexual maturity or outside the breeding season.
    fn todays_offspring_proportion(&self, day: u16) -> Result<f64> {
        if self.sex == Sex::Male {
            return Ok(0.0);
        }
        if self.age_years() < self.hft.life_history_sexual_maturity as f64 {
            return Ok(0.0);
        }
        let body_condition = match self.hft.reproduction_condition {
            BodyConditionSource::Instantaneous => self.body_condition(),
            BodyConditionSource::GestationAverage => self
                .body_condition_gestation
                .average()
                .unwrap_or_else(|| self.body_condition()),
        };
        let season = BreedingSeason::new(
            self.hft.breeding_season_start,
            self.hft.breeding_season_length,
        )?;
        let annual_max = self.hft.reproduction_annual_maximum;
        let model = match self.hft.reproduction_model {
            ReproductionModel::IlliusOConnor2000 => {
                Reproduction::illius_oconnor_2000(season, annual_max)?
            }
            ReproductionModel::ConstMax => Reproduction::const_max(season, annual_max)?,
            ReproductionModel::Linear => Reproduction::linear(season, annual_max)?,
        };
        model.offspring_per_day(day, body_condition)
    }

    /// Apply all enabled mortality factors once for today; returns the
    /// per-factor rates for the output.
    fn apply_mortality_factors_today(
        &mut self,
    ) -> Result<std::collections::BTreeMap<MortalityFactor, f64>> {
        let mut rates = std::collections::BTreeMap::new();
        let mut total: f64 = 0.0;
        for factor in self.hft.mortality_factors.clone() {
            let rate = match factor {
                MortalityFactor::Background => GetBackgroundMortality::new(
                    self.hft.mortality_background_juvenile,
                    self.hft.mortality_background_adult,
                )?
                .mortality(self.age_days),
                MortalityFactor::Lifespan => {
                    GetSimpleLifespanMortality::new(self.hft.life_history_lifespan)?
                        .mortality(self.age_days)
                }
                MortalityFactor::StarvationThreshold => {
                    GetStarvationMortalityThreshold::new(self.hft.mortality_minimum_body_fat)?
                        .mortality(self.body_fat())?
                }
                MortalityFactor::StarvationIlliusOConnor2000 => {
                    let model = GetStarvationIlliusOConnor2000::new(
                        self.hft.body_fat_deviation,
                        self.hft.mortality_shift_body_condition,
                    )?;
                    let (rate, new_body_condition) = model.mortality(self.body_condition())?;
                    if new_body_condition != self.body_condition() {
                        self.energy_budget.force_body_condition(new_body_condition)?;
                    }
                    rate
                }
            };
            rates.insert(factor, rate);
            total += rate;
        }
        self.apply_mortality(total.min(1.0))?;
        Ok(rates)
    }

    /// Reduce the individual density by a mortality fraction.
    fn apply_mortality(&mut self, mortality: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&mortality) {
            return Err(SimError::invalid("mortality must be within [0,1]"));
        }
        self.ind_per_km2 = (self.ind_per_km2 * (1.0 - mortality)).max(0.0);
        Ok(())
    }
}

/// Structural mass [kg/ind] for the given age.
fn structural_mass_at(hft: &Hft, sex: Sex, age_days: u32) -> f64 {
    let birth =
        hft.body_mass_birth * hft.body_mass_empty * (1.0 - hft.body_fat_birth);
    let adult =
        hft.body_mass_adult(sex) * hft.body_mass_empty * (1.0 - hft.body_fat_maximum / 2.0);
    let maturity_days = hft.physical_maturity(sex) * 365;
    if age_days >= maturity_days {
        adult
    } else {
        birth + (adult - birth) * age_days as f64 / maturity_days as f64
    }
}

/// Maximum fat mass [kg/ind] for the given age, derived from the
/// structural mass so that at full reserves the empty-body fat fraction
/// equals the HFT maximum.
fn max_fatmass_at(hft: &Hft, sex: Sex, age_days: u32) -> f64 {
    structural_mass_at(hft, sex, age_days) * hft.body_fat_maximum
        / (1.0 - hft.body_fat_maximum)
}
