//! Bounded parameter space for calibration and random sampling.

use rand::Rng;

use super::constants::{param_index, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};
use super::params::Parameters;
use crate::error::HbvError;

/// One `[lower, upper]` pair per parameter, in canonical order.
///
/// A parameter whose bounds coincide is fixed: sampling and optimisation
/// always return that value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    bounds: [(f64, f64); N_PARAMS],
}

impl Default for ParameterSpace {
    fn default() -> Self {
        let mut bounds = [(0.0, 0.0); N_PARAMS];
        bounds.copy_from_slice(PARAM_BOUNDS);
        Self { bounds }
    }
}

impl ParameterSpace {
    /// Default HBV-Educational calibration bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the bounds of one parameter.
    pub fn with_bound(mut self, name: &str, lower: f64, upper: f64) -> Result<Self, HbvError> {
        let idx = param_index(name)
            .ok_or_else(|| HbvError::invalid_parameter(name, "unknown parameter name"))?;
        if !lower.is_finite() || !upper.is_finite() {
            return Err(HbvError::invalid_parameter(
                name,
                format!("bounds [{lower}, {upper}] must be finite"),
            ));
        }
        if lower > upper {
            return Err(HbvError::invalid_parameter(
                name,
                format!("lower bound {lower} exceeds upper bound {upper}"),
            ));
        }
        self.bounds[idx] = (lower, upper);
        Ok(self)
    }

    /// Pin one parameter to a single value.
    pub fn with_fixed(self, name: &str, value: f64) -> Result<Self, HbvError> {
        self.with_bound(name, value, value)
    }

    /// Bounds in canonical order.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Bounds of one parameter by name.
    pub fn bound(&self, name: &str) -> Option<(f64, f64)> {
        param_index(name).map(|i| self.bounds[i])
    }

    /// Number of dimensions (always the full parameter count).
    pub fn dim(&self) -> usize {
        N_PARAMS
    }

    /// Returns `true` if every value lies within its bounds.
    pub fn contains(&self, params: &Parameters) -> bool {
        params
            .to_array()
            .iter()
            .zip(&self.bounds)
            .all(|(v, &(lo, hi))| (lo..=hi).contains(v))
    }

    /// Names of the parameters whose values fall outside their bounds.
    pub fn violations(&self, params: &Parameters) -> Vec<&'static str> {
        params
            .to_array()
            .iter()
            .zip(&self.bounds)
            .zip(PARAM_NAMES)
            .filter(|((v, b), _)| !(b.0..=b.1).contains(*v))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Draw one parameter set uniformly within the bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Parameters {
        let mut arr = [0.0; N_PARAMS];
        for (v, &(lo, hi)) in arr.iter_mut().zip(&self.bounds) {
            *v = uniform(rng, lo, hi);
        }
        self.to_parameters(&arr)
    }

    /// Build parameters from a vector produced inside this space.
    ///
    /// Values are clipped to the bounds first so optimiser round-off never
    /// leaks out-of-range values.
    pub fn to_parameters(&self, x: &[f64]) -> Parameters {
        let mut arr = [0.0; N_PARAMS];
        for ((out, &v), &(lo, hi)) in arr.iter_mut().zip(x).zip(&self.bounds) {
            *out = v.clamp(lo, hi);
        }
        let [t_t, dd, fc, beta, c, pwp, k_0, k_1, k_2, k_p, l] = arr;
        Parameters {
            t_t,
            dd,
            fc,
            beta,
            c,
            pwp,
            k_0,
            k_1,
            k_2,
            k_p,
            l,
        }
    }
}

/// Uniform draw on `[lo, hi]`; degenerate ranges return `lo`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        let u: f64 = rng.random();
        (lo + u * (hi - lo)).min(hi)
    } else {
        lo
    }
}
