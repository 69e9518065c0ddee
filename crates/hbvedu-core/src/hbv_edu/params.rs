/// HBV-Educational parameters.
///
/// 11 parameters that define model behaviour. Values are immutable once
/// built; calibration produces new `Parameters` rather than editing one.
use serde::{Deserialize, Serialize};

use super::constants::{param_index, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};
use crate::error::HbvError;
use crate::traits::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    /// Temperature threshold [C].
    #[serde(rename = "T_t")]
    pub t_t: f64,
    /// Degree-day factor [mm/C/d].
    #[serde(rename = "DD")]
    pub dd: f64,
    /// Field capacity [mm].
    #[serde(rename = "FC")]
    pub fc: f64,
    /// Soil routing shape exponent [-].
    #[serde(rename = "Beta")]
    pub beta: f64,
    /// PET temperature correction factor [1/C].
    #[serde(rename = "C")]
    pub c: f64,
    /// Permanent wilting point [mm].
    #[serde(rename = "PWP")]
    pub pwp: f64,
    /// Near-surface flow coefficient [1/d].
    #[serde(rename = "K_0")]
    pub k_0: f64,
    /// Interflow coefficient [1/d].
    #[serde(rename = "K_1")]
    pub k_1: f64,
    /// Baseflow coefficient [1/d].
    #[serde(rename = "K_2")]
    pub k_2: f64,
    /// Percolation coefficient [1/d].
    #[serde(rename = "K_p")]
    pub k_p: f64,
    /// Near-surface flow threshold [mm].
    #[serde(rename = "L")]
    pub l: f64,
}

impl Parameters {
    /// Create new Parameters, returning an error if any value is non-finite.
    ///
    /// Values outside the default calibration bounds are accepted; see
    /// [`super::space::ParameterSpace::contains`] for a bounds check.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t_t: f64,
        dd: f64,
        fc: f64,
        beta: f64,
        c: f64,
        pwp: f64,
        k_0: f64,
        k_1: f64,
        k_2: f64,
        k_p: f64,
        l: f64,
    ) -> Result<Self, HbvError> {
        let p = Self {
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
        };
        p.validate()?;
        Ok(p)
    }

    /// Check that every value is finite.
    pub fn validate(&self) -> Result<(), HbvError> {
        for (name, value) in PARAM_NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(HbvError::invalid_parameter(
                    *name,
                    format!("value {value} is not finite"),
                ));
            }
        }
        Ok(())
    }

    /// Create Parameters from an 11-element slice in canonical order.
    pub fn from_array(arr: &[f64]) -> Result<Self, HbvError> {
        let values: [f64; N_PARAMS] = arr.try_into().map_err(|_| {
            HbvError::invalid_parameter(
                "params",
                format!("expected {N_PARAMS} values, got {}", arr.len()),
            )
        })?;
        let [t_t, dd, fc, beta, c, pwp, k_0, k_1, k_2, k_p, l] = values;
        Self::new(t_t, dd, fc, beta, c, pwp, k_0, k_1, k_2, k_p, l)
    }

    /// Convert to an 11-element array in canonical order.
    pub fn to_array(&self) -> [f64; N_PARAMS] {
        [
            self.t_t, self.dd, self.fc, self.beta, self.c, self.pwp, self.k_0, self.k_1,
            self.k_2, self.k_p, self.l,
        ]
    }

    /// Build from `(name, value)` pairs.
    ///
    /// Every canonical name must appear exactly once; unknown names are
    /// rejected.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self, HbvError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values: [Option<f64>; N_PARAMS] = [None; N_PARAMS];
        for (name, value) in pairs {
            let idx = param_index(name)
                .ok_or_else(|| HbvError::invalid_parameter(name, "unknown parameter name"))?;
            if values[idx].replace(value).is_some() {
                return Err(HbvError::invalid_parameter(name, "given more than once"));
            }
        }

        let mut arr = [0.0; N_PARAMS];
        for (i, v) in values.iter().enumerate() {
            arr[i] = v.ok_or_else(|| HbvError::invalid_parameter(PARAM_NAMES[i], "missing"))?;
        }
        Self::from_array(&arr)
    }

    /// `(name, value)` pairs in canonical order.
    pub fn to_named(&self) -> Vec<(&'static str, f64)> {
        PARAM_NAMES.iter().copied().zip(self.to_array()).collect()
    }

    /// Look up a value by canonical name.
    pub fn get(&self, name: &str) -> Option<f64> {
        param_index(name).map(|i| self.to_array()[i])
    }
}

impl ModelParams for Parameters {
    const N_PARAMS: usize = N_PARAMS;
    const PARAM_NAMES: &'static [&'static str] = PARAM_NAMES;
    const PARAM_BOUNDS: &'static [(f64, f64)] = PARAM_BOUNDS;

    fn from_array(arr: &[f64]) -> Result<Self, HbvError> {
        Parameters::from_array(arr)
    }

    fn to_array(&self) -> Vec<f64> {
        Parameters::to_array(self).to_vec()
    }
}
