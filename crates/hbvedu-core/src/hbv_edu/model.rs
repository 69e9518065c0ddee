//! `HbvModel`: the catchment-level template shared by simulation and
//! calibration.
//!
//! Holds what does not change between trials (catchment area and parameter
//! bounds). Parameters are always passed in explicitly.

use rand::Rng;

use super::fluxes::FluxesTimeseries;
use super::params::Parameters;
use super::run;
use super::space::ParameterSpace;
use super::state::ReservoirState;
use crate::error::HbvError;
use crate::forcing::{ModelInputs, WatershedConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct HbvModel {
    watershed: WatershedConfig,
    space: ParameterSpace,
}

impl HbvModel {
    /// Model for a catchment of `area_km2`, with default parameter bounds.
    pub fn new(area_km2: f64) -> Result<Self, HbvError> {
        Ok(Self {
            watershed: WatershedConfig::new(area_km2)?,
            space: ParameterSpace::default(),
        })
    }

    /// Replace the parameter space used for sampling and calibration.
    pub fn with_space(mut self, space: ParameterSpace) -> Self {
        self.space = space;
        self
    }

    pub fn watershed(&self) -> &WatershedConfig {
        &self.watershed
    }

    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Draw a random parameter set within the model's bounds.
    pub fn random_parameters<R: Rng + ?Sized>(&self, rng: &mut R) -> Parameters {
        self.space.sample(rng)
    }

    /// Simulated discharge [m3/s] for `inputs`.
    pub fn simulate(&self, params: &Parameters, inputs: &ModelInputs) -> Result<Vec<f64>, HbvError> {
        let (forcing, normals) = inputs.prepare()?;
        run::simulate(
            params,
            &forcing,
            &normals,
            &self.watershed,
            &inputs.initial_state,
        )
    }

    /// Full flux output and final state for `inputs`.
    pub fn run(
        &self,
        params: &Parameters,
        inputs: &ModelInputs,
    ) -> Result<(FluxesTimeseries, ReservoirState), HbvError> {
        let (forcing, normals) = inputs.prepare()?;
        run::run(
            params,
            &forcing,
            &normals,
            &self.watershed,
            &inputs.initial_state,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs() -> ModelInputs {
        ModelInputs {
            temp: vec![5.0, -2.0, 8.0, 11.0],
            prec: vec![10.0, 4.0, 0.0, 20.0],
            month: vec![4, 4, 5, 5],
            pe_m: vec![1.5; 12],
            t_m: vec![6.0; 12],
            initial_state: ReservoirState::new(0.0, 100.0, 10.0, 30.0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_bad_area() {
        assert!(matches!(
            HbvModel::new(-1.0),
            Err(HbvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn simulate_length_matches_forcing() {
        let model = HbvModel::new(120.0).unwrap();
        let p = model.random_parameters(&mut StdRng::seed_from_u64(5));
        let q = model.simulate(&p, &inputs()).unwrap();
        assert_eq!(q.len(), 4);
        assert!(q.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn simulate_reports_shape_mismatch() {
        let model = HbvModel::new(120.0).unwrap();
        let p = model.random_parameters(&mut StdRng::seed_from_u64(5));
        let mut bad = inputs();
        bad.prec.pop();
        assert!(matches!(
            model.simulate(&p, &bad),
            Err(HbvError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn run_exposes_final_state() {
        let model = HbvModel::new(120.0).unwrap();
        let p = model.random_parameters(&mut StdRng::seed_from_u64(8));
        let (ts, state) = model.run(&p, &inputs()).unwrap();
        assert_eq!(ts.len(), 4);
        assert_eq!(state.soil_moisture, ts.soil_moisture[3]);
    }

    #[test]
    fn custom_space_is_used_for_sampling() {
        let space = ParameterSpace::new().with_fixed("FC", 321.0).unwrap();
        let model = HbvModel::new(10.0).unwrap().with_space(space);
        let p = model.random_parameters(&mut StdRng::seed_from_u64(2));
        assert_eq!(p.fc, 321.0);
    }
}
