/// HBV-Educational reservoir state.
///
/// Four storages [mm] that evolve during simulation. A fresh state is
/// created for every run from caller-supplied values, defaulting to zero.
use serde::{Deserialize, Serialize};

use super::constants::STATE_SIZE;
use crate::error::HbvError;
use crate::traits::ModelState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReservoirState {
    /// Snow water equivalent [mm].
    pub snow: f64,
    /// Soil moisture storage [mm].
    pub soil_moisture: f64,
    /// Near-surface flow reservoir, S1 [mm].
    pub s1: f64,
    /// Base-flow reservoir, S2 [mm].
    pub s2: f64,
}

impl ReservoirState {
    pub fn new(snow: f64, soil_moisture: f64, s1: f64, s2: f64) -> Result<Self, HbvError> {
        let state = Self {
            snow,
            soil_moisture,
            s1,
            s2,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check that every storage is finite and non-negative.
    pub fn validate(&self) -> Result<(), HbvError> {
        let named = [
            ("snow", self.snow),
            ("soil_moisture", self.soil_moisture),
            ("s1", self.s1),
            ("s2", self.s2),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(HbvError::InvalidConfiguration(format!(
                    "initial {name} storage must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Total water held in all storages [mm].
    pub fn total_storage(&self) -> f64 {
        self.snow + self.soil_moisture + self.s1 + self.s2
    }

    /// Flatten to `[snow, soil_moisture, s1, s2]`.
    pub fn to_array(&self) -> [f64; STATE_SIZE] {
        [self.snow, self.soil_moisture, self.s1, self.s2]
    }
}

impl ModelState for ReservoirState {
    fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    fn from_slice(arr: &[f64]) -> Result<Self, HbvError> {
        match *arr {
            [snow, soil_moisture, s1, s2] => Self::new(snow, soil_moisture, s1, s2),
            _ => Err(HbvError::InvalidConfiguration(format!(
                "expected {STATE_SIZE} state elements, got {}",
                arr.len()
            ))),
        }
    }
}
