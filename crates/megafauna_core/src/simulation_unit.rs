//! One habitat together with the herbivore populations living in it.

use crate::habitat::Habitat;
use crate::population::CohortPopulation;
use megafauna_data::CombinedData;

/// A habitat plus its populations, simulated together day by day.
pub struct SimulationUnit {
    pub(crate) habitat: Box<dyn Habitat>,
    pub(crate) populations: Vec<CohortPopulation>,
    pub(crate) current_output: CombinedData,
    initial_establishment_done: bool,
}

impl SimulationUnit {
    #[must_use]
    pub fn new(habitat: Box<dyn Habitat>, populations: Vec<CohortPopulation>) -> Self {
        Self {
            habitat,
            populations,
            current_output: CombinedData::default(),
            initial_establishment_done: false,
        }
    }

    #[must_use]
    pub fn habitat(&self) -> &dyn Habitat {
        self.habitat.as_ref()
    }

    #[must_use]
    pub fn habitat_mut(&mut self) -> &mut dyn Habitat {
        self.habitat.as_mut()
    }

    #[must_use]
    pub fn populations(&self) -> &[CohortPopulation] {
        &self.populations
    }

    /// The output of the most recently completed simulation day.
    #[must_use]
    pub fn current_output(&self) -> &CombinedData {
        &self.current_output
    }

    #[must_use]
    pub fn is_initial_establishment_done(&self) -> bool {
        self.initial_establishment_done
    }

    pub fn set_initial_establishment_done(&mut self) {
        self.initial_establishment_done = true;
    }
}
