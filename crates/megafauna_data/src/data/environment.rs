//! Abiotic habitat conditions passed from the host vegetation model.

use serde::{Deserialize, Serialize};

/// Current abiotic conditions in a habitat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitatEnvironment {
    /// Air temperature [°C].
    pub air_temperature: f64,

    /// Snow depth [cm].
    pub snow_depth: f64,
}

impl Default for HabitatEnvironment {
    fn default() -> Self {
        Self {
            air_temperature: 10.0,
            snow_depth: 0.0,
        }
    }
}
