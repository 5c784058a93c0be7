//! The herbivore functional type: one immutable parameter record per
//! species or guild, shared read-only by all of its animals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sex of a herbivore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

/// Digestion physiology of a herbivore type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestionType {
    Ruminant,
    /// Hindgut fermenter (caecalid).
    Hindgut,
}

/// How the energy-wise diet composition is put together each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietComposer {
    /// The whole diet is grass.
    PureGrazer,
}

/// Upper bound on daily intake imposed by gut throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestiveLimit {
    None,
    /// Allometric curve through a given point at male adult mass
    /// ([`Hft::digestion_allometric`]).
    Allometric,
    /// Fixed fraction of body mass ([`Hft::digestion_fixed_fraction`]),
    /// metabolically scaled for juveniles.
    FixedFraction,
    /// Digestive passage model of Illius & Gordon (1992)
    /// ([`Hft::digestion_i_g_1992_ijk`]).
    #[serde(rename = "illius_gordon_1992")]
    IlliusGordon1992,
}

/// Upper bound on daily intake imposed by harvesting rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForagingLimit {
    /// Holling type II functional response with the Illius & Gordon
    /// (1992) digestive limit as asymptote; grass only.
    #[serde(rename = "illius_o_connor_2000")]
    IlliusOConnor2000,
    /// Holling type II applied on top of all other limits, with the
    /// already-computed limit as asymptote; grass only.
    GeneralFunctionalResponse,
}

/// Algorithm converting digestibility to net energy content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetEnergyModel {
    /// ME = 15·digestibility; NE after Illius & Gordon (1992).
    Default,
}

/// Components of daily energy expenditure; any subset may be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenditureComponent {
    /// Basal field metabolic rate after Taylor et al. (1981).
    #[serde(rename = "taylor_1981")]
    Taylor1981,
    /// Temperature-dependent maintenance after Zhu et al. (2018).
    #[serde(rename = "zhu_2018")]
    Zhu2018,
    /// Heat-loss compensation below the lower critical temperature.
    Thermoregulation,
}

/// Death causes; any subset may be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MortalityFactor {
    Background,
    Lifespan,
    StarvationThreshold,
    #[serde(rename = "starvation_illius_o_connor_2000")]
    StarvationIlliusOConnor2000,
}

impl fmt::Display for MortalityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MortalityFactor::Background => "background",
            MortalityFactor::Lifespan => "lifespan",
            MortalityFactor::StarvationThreshold => "starvation_threshold",
            MortalityFactor::StarvationIlliusOConnor2000 => "starvation_illius_o_connor_2000",
        };
        write!(f, "{name}")
    }
}

/// Reproduction rate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionModel {
    /// Logistic dependence on body condition, Illius & O’Connor (2000).
    #[serde(rename = "illius_o_connor_2000")]
    IlliusOConnor2000,
    /// Constant maximum rate inside the breeding season.
    ConstMax,
    /// Rate increases linearly with body condition.
    Linear,
}

/// Which body condition feeds into the reproduction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyConditionSource {
    /// Today's fat mass over maximum fat mass.
    Instantaneous,
    /// Rolling mean over the gestation window.
    GestationAverage,
}

/// Whole-body thermal conductance model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductanceModel {
    /// Allometric conductance after Bradley & Deavers (1980).
    #[serde(rename = "bradley_deavers_1980")]
    BradleyDeavers1980,
    /// A fixed conductance [W/°C] per individual.
    Constant(f64),
}

/// An allometric relation `y = c·xᵉ` defined by its exponent and its value
/// at male adult body mass, from which `c` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GivenPointAllometry {
    pub exponent: f64,
    pub value_male_adult: f64,
}

/// One herbivore functional type.
///
/// Created once at load time and shared read-only (`Arc<Hft>`) by every
/// animal of the type. Defaults describe a generic 100-kg grazing
/// ruminant; instruction files override per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hft {
    /// Unique name, used as output column caption.
    pub name: String,

    /// Fraction of the empty body that is fat at birth.
    pub body_fat_birth: f64,
    /// Standard deviation of body condition within a cohort, for the
    /// starvation model of Illius & O’Connor (2000).
    pub body_fat_deviation: f64,
    /// Maximum fraction of the empty body that can be fat.
    pub body_fat_maximum: f64,
    /// Maximum fat gain [kg fat per kg body mass per day]; zero = no limit.
    pub body_fat_maximum_daily_gain: f64,
    /// Live weight at birth [kg/ind].
    pub body_mass_birth: f64,
    /// Empty body fraction: empty body mass over live weight.
    pub body_mass_empty: f64,
    /// Adult female live weight [kg/ind] at half of maximum fat reserves.
    pub body_mass_female: f64,
    /// Adult male live weight [kg/ind] at half of maximum fat reserves.
    pub body_mass_male: f64,

    /// First day of the breeding season (0 = Jan 1st).
    pub breeding_season_start: u16,
    /// Length of the breeding season [days].
    pub breeding_season_length: u16,

    /// Parameters for [`DigestiveLimit::Allometric`] [kgDM/ind/day].
    pub digestion_allometric: GivenPointAllometry,
    /// Parameter for [`DigestiveLimit::FixedFraction`]: daily dry-matter
    /// intake as a fraction of body mass.
    pub digestion_fixed_fraction: f64,
    /// Constants i, j, k for [`DigestiveLimit::IlliusGordon1992`]
    /// (regression constants of Shipley et al. 1999).
    pub digestion_i_g_1992_ijk: [f64; 3],
    pub digestion_limit: DigestiveLimit,
    pub digestion_net_energy_model: NetEnergyModel,
    pub digestion_type: DigestionType,

    /// Age range [years] over which establishment spreads the cohorts.
    pub establishment_age_range: (u32, u32),
    /// Fat reserves of newly established animals as a fraction of the
    /// maximum.
    pub establishment_body_condition: f64,
    /// Total density for initial establishment [ind/km²].
    pub establishment_density: f64,

    pub expenditure_components: Vec<ExpenditureComponent>,

    pub foraging_diet_composer: DietComposer,
    /// Half-saturation grass density β [gDM/m²] for the functional
    /// response models.
    pub foraging_half_max_intake_density: f64,
    pub foraging_limits: Vec<ForagingLimit>,

    /// Maximum age [years].
    pub life_history_lifespan: u32,
    /// Age [years] at which females reach adult body mass.
    pub life_history_physical_maturity_female: u32,
    /// Age [years] at which males reach adult body mass.
    pub life_history_physical_maturity_male: u32,
    /// Age [years] at which females start reproducing.
    pub life_history_sexual_maturity: u32,
    /// Gestation window [days] for the rolling body-condition average.
    pub life_history_gestation_days: u32,

    /// Annual background mortality after the first year [0,1).
    pub mortality_background_adult: f64,
    /// Annual background mortality in the first year of life [0,1).
    pub mortality_background_juvenile: f64,
    pub mortality_factors: Vec<MortalityFactor>,
    /// Minimum body fat fraction below which
    /// [`MortalityFactor::StarvationThreshold`] kills.
    pub mortality_minimum_body_fat: f64,
    /// A population below this fraction of the establishment density is
    /// not viable and dies off entirely.
    pub mortality_minimum_density_threshold: f64,
    /// Whether starvation after Illius & O’Connor (2000) shifts the
    /// cohort's mean body condition up as the starved tail dies.
    pub mortality_shift_body_condition: bool,

    /// Maximum offspring per female per year under optimal nutrition.
    pub reproduction_annual_maximum: f64,
    pub reproduction_condition: BodyConditionSource,
    pub reproduction_model: ReproductionModel,

    pub thermoregulation_conductance: ConductanceModel,
    /// Body core temperature [°C].
    pub thermoregulation_core_temperature: f64,
}

impl Default for Hft {
    fn default() -> Self {
        Self {
            name: String::new(),
            body_fat_birth: 0.05,
            body_fat_deviation: 0.125,
            body_fat_maximum: 0.3,
            body_fat_maximum_daily_gain: 0.0,
            body_mass_birth: 5.0,
            body_mass_empty: 0.87,
            body_mass_female: 90.0,
            body_mass_male: 100.0,
            breeding_season_start: 121,
            breeding_season_length: 30,
            digestion_allometric: GivenPointAllometry {
                exponent: 0.76,
                value_male_adult: 4.0,
            },
            digestion_fixed_fraction: 0.05,
            // Ruminant values from Shipley et al. (1999).
            digestion_i_g_1992_ijk: [0.034, 3.565, 0.077],
            digestion_limit: DigestiveLimit::IlliusGordon1992,
            digestion_net_energy_model: NetEnergyModel::Default,
            digestion_type: DigestionType::Ruminant,
            establishment_age_range: (1, 15),
            establishment_body_condition: 1.0,
            establishment_density: 1.0,
            expenditure_components: vec![ExpenditureComponent::Taylor1981],
            foraging_diet_composer: DietComposer::PureGrazer,
            foraging_half_max_intake_density: 40.0,
            foraging_limits: vec![ForagingLimit::IlliusOConnor2000],
            life_history_lifespan: 16,
            life_history_physical_maturity_female: 3,
            life_history_physical_maturity_male: 3,
            life_history_sexual_maturity: 2,
            life_history_gestation_days: 270,
            mortality_background_adult: 0.1,
            mortality_background_juvenile: 0.3,
            mortality_factors: vec![
                MortalityFactor::Background,
                MortalityFactor::Lifespan,
                MortalityFactor::StarvationIlliusOConnor2000,
            ],
            mortality_minimum_body_fat: 0.05,
            mortality_minimum_density_threshold: 0.05,
            mortality_shift_body_condition: true,
            reproduction_annual_maximum: 1.0,
            reproduction_condition: BodyConditionSource::Instantaneous,
            reproduction_model: ReproductionModel::IlliusOConnor2000,
            thermoregulation_conductance: ConductanceModel::BradleyDeavers1980,
            thermoregulation_core_temperature: 38.0,
        }
    }
}

impl Hft {
    /// Check all parameters once after loading; returns the list of
    /// violations (empty = valid).
    #[must_use]
    pub fn find_invalid_parameters(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut check = |condition: bool, message: &str| {
            if !condition {
                errors.push(format!("HFT \"{}\": {}", self.name, message));
            }
        };

        check(!self.name.is_empty(), "name must not be empty");
        check(
            (0.0..1.0).contains(&self.body_fat_birth),
            "body_fat_birth must be in [0,1)",
        );
        check(
            (0.0..=1.0).contains(&self.body_fat_deviation),
            "body_fat_deviation must be in [0,1]",
        );
        check(
            self.body_fat_maximum > 0.0 && self.body_fat_maximum < 1.0,
            "body_fat_maximum must be in (0,1)",
        );
        check(
            self.body_fat_birth < self.body_fat_maximum,
            "body_fat_birth must be below body_fat_maximum",
        );
        check(
            self.body_fat_maximum_daily_gain >= 0.0,
            "body_fat_maximum_daily_gain must not be negative",
        );
        check(self.body_mass_birth > 0.0, "body_mass_birth must be positive");
        check(
            self.body_mass_empty > 0.0 && self.body_mass_empty <= 1.0,
            "body_mass_empty must be in (0,1]",
        );
        check(
            self.body_mass_female >= self.body_mass_birth,
            "body_mass_female must be at least body_mass_birth",
        );
        check(
            self.body_mass_male >= self.body_mass_birth,
            "body_mass_male must be at least body_mass_birth",
        );
        check(
            self.breeding_season_start < 365,
            "breeding_season_start must be in [0,364]",
        );
        check(
            (1..=365).contains(&self.breeding_season_length),
            "breeding_season_length must be in [1,365]",
        );
        check(
            self.digestion_fixed_fraction > 0.0,
            "digestion_fixed_fraction must be positive",
        );
        check(
            self.establishment_age_range.0 >= 1,
            "establishment_age_range must start at one year or later",
        );
        check(
            self.establishment_age_range.0 <= self.establishment_age_range.1,
            "establishment_age_range must be ordered",
        );
        check(
            self.establishment_age_range.1 < self.life_history_lifespan,
            "establishment_age_range must lie below the lifespan",
        );
        check(
            (0.0..=1.0).contains(&self.establishment_body_condition),
            "establishment_body_condition must be in [0,1]",
        );
        check(
            self.establishment_density >= 0.0,
            "establishment_density must not be negative",
        );
        check(
            self.foraging_half_max_intake_density > 0.0,
            "foraging_half_max_intake_density must be positive",
        );
        check(self.life_history_lifespan > 0, "lifespan must be positive");
        check(
            self.life_history_physical_maturity_female > 0
                && self.life_history_physical_maturity_female < self.life_history_lifespan,
            "female physical maturity must be within the lifespan",
        );
        check(
            self.life_history_physical_maturity_male > 0
                && self.life_history_physical_maturity_male < self.life_history_lifespan,
            "male physical maturity must be within the lifespan",
        );
        check(
            self.life_history_sexual_maturity > 0
                && self.life_history_sexual_maturity < self.life_history_lifespan,
            "sexual maturity must be within the lifespan",
        );
        check(
            (0.0..1.0).contains(&self.mortality_background_adult),
            "mortality_background_adult must be in [0,1)",
        );
        check(
            (0.0..1.0).contains(&self.mortality_background_juvenile),
            "mortality_background_juvenile must be in [0,1)",
        );
        check(
            (0.0..1.0).contains(&self.mortality_minimum_body_fat),
            "mortality_minimum_body_fat must be in [0,1)",
        );
        check(
            (0.0..=1.0).contains(&self.mortality_minimum_density_threshold),
            "mortality_minimum_density_threshold must be in [0,1]",
        );
        check(
            self.reproduction_annual_maximum >= 0.0,
            "reproduction_annual_maximum must not be negative",
        );
        if let ConductanceModel::Constant(conductance) = self.thermoregulation_conductance {
            check(conductance > 0.0, "constant conductance must be positive");
        }

        // Incompatible combinations.
        let needs_grazer = self.digestion_limit == DigestiveLimit::IlliusGordon1992
            || self
                .foraging_limits
                .contains(&ForagingLimit::IlliusOConnor2000);
        check(
            !needs_grazer || self.foraging_diet_composer == DietComposer::PureGrazer,
            "the Illius & Gordon / Illius & O’Connor intake models apply to pure grazers only",
        );
        check(
            !self
                .expenditure_components
                .contains(&ExpenditureComponent::Thermoregulation)
                || self.expenditure_components.len() > 1,
            "thermoregulation needs another expenditure component as thermoneutral baseline",
        );

        errors
    }

    /// Adult live weight for one sex [kg/ind].
    #[must_use]
    pub fn body_mass_adult(&self, sex: Sex) -> f64 {
        match sex {
            Sex::Female => self.body_mass_female,
            Sex::Male => self.body_mass_male,
        }
    }

    /// Age of physical maturity for one sex [years].
    #[must_use]
    pub fn physical_maturity(&self, sex: Sex) -> u32 {
        match sex {
            Sex::Female => self.life_history_physical_maturity_female,
            Sex::Male => self.life_history_physical_maturity_male,
        }
    }
}
