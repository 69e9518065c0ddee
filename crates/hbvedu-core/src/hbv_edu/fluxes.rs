/// HBV-Educational per-step diagnostic fluxes.
use hbvedu_macros::Fluxes;

use crate::traits::FluxesTimeseriesOps;

/// Fluxes and end-of-step storages for one day.
///
/// Depths are mm/d (or mm for storages); `discharge` is m3/s.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
pub struct Fluxes {
    pub temp: f64,
    pub prec: f64,
    pub pet: f64,
    pub rain: f64,
    pub snowfall: f64,
    pub melt: f64,
    pub snow: f64,
    pub soil_input: f64,
    pub recharge: f64,
    pub actual_et: f64,
    pub soil_moisture: f64,
    pub q0: f64,
    pub q1: f64,
    pub percolation: f64,
    pub q2: f64,
    pub s1: f64,
    pub s2: f64,
    /// Specific runoff `q0 + q1 + q2` [mm/d].
    pub runoff: f64,
    pub discharge: f64,
}

impl FluxesTimeseriesOps<Fluxes> for FluxesTimeseries {
    fn with_capacity(n: usize) -> Self {
        FluxesTimeseries::with_capacity(n)
    }

    fn push(&mut self, f: &Fluxes) {
        FluxesTimeseries::push(self, f);
    }

    fn len(&self) -> usize {
        FluxesTimeseries::len(self)
    }

    fn is_empty(&self) -> bool {
        FluxesTimeseries::is_empty(self)
    }
}
