use std::collections::HashMap;

use numpy::{PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use hbvedu_core::forcing::ModelInputs;
use hbvedu_core::hbv_edu::{ParameterSpace, Parameters, ReservoirState};

use crate::errors::to_py_err;

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice().map_err(|_| {
        pyo3::exceptions::PyValueError::new_err("array must be C-contiguous")
    })
}

/// Validate length + contiguity of a numpy array.
pub fn checked_slice<'py>(
    arr: &'py PyReadonlyArray1<'py, f64>,
    expected_len: usize,
    name: &str,
) -> PyResult<&'py [f64]> {
    let slice = contiguous_slice(arr)?;
    if slice.len() != expected_len {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "{} must have {} elements, got {}",
            name, expected_len, slice.len()
        )));
    }
    Ok(slice)
}

/// Month numbers from any integer sequence. Values outside `u8` become 0 so
/// the core reports them as out of range.
pub fn months(values: Vec<i64>) -> Vec<u8> {
    values
        .into_iter()
        .map(|m| u8::try_from(m).unwrap_or(0))
        .collect()
}

/// `{"FC": 250.0, ...}` with exactly the eleven canonical names.
pub fn parameters(params: &HashMap<String, f64>) -> PyResult<Parameters> {
    Parameters::from_named(params.iter().map(|(k, v)| (k.as_str(), *v))).map_err(to_py_err)
}

/// Partial state dict; missing stores start empty.
pub fn reservoir_state(state: Option<&HashMap<String, f64>>) -> PyResult<ReservoirState> {
    let Some(state) = state else {
        return Ok(ReservoirState::default());
    };
    let mut out = ReservoirState::default();
    for (key, &value) in state {
        match key.as_str() {
            "snow" => out.snow = value,
            "soil_moisture" => out.soil_moisture = value,
            "s1" => out.s1 = value,
            "s2" => out.s2 = value,
            other => {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "unknown state variable {other:?}; expected snow, soil_moisture, s1 or s2"
                )))
            }
        }
    }
    out.validate().map_err(to_py_err)?;
    Ok(out)
}

pub fn state_dict<'py>(py: Python<'py>, state: &ReservoirState) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("snow", state.snow)?;
    dict.set_item("soil_moisture", state.soil_moisture)?;
    dict.set_item("s1", state.s1)?;
    dict.set_item("s2", state.s2)?;
    Ok(dict)
}

pub fn params_dict<'py>(py: Python<'py>, params: &Parameters) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (name, value) in params.to_named() {
        dict.set_item(name, value)?;
    }
    Ok(dict)
}

/// Default space narrowed by `{"FC": (lo, hi), ...}` overrides.
pub fn space(bounds: Option<&HashMap<String, (f64, f64)>>) -> PyResult<ParameterSpace> {
    let mut space = ParameterSpace::new();
    for (name, &(lo, hi)) in bounds.into_iter().flatten() {
        space = space.with_bound(name, lo, hi).map_err(to_py_err)?;
    }
    Ok(space)
}

/// Forcing arrays as passed from Python.
pub struct Forcing<'py> {
    pub temp: PyReadonlyArray1<'py, f64>,
    pub prec: PyReadonlyArray1<'py, f64>,
    pub month: Vec<i64>,
    pub pe_m: PyReadonlyArray1<'py, f64>,
    pub t_m: PyReadonlyArray1<'py, f64>,
}

impl Forcing<'_> {
    /// Copy into owned inputs; lengths are checked by the core.
    pub fn into_inputs(
        self,
        qobs: Option<&[f64]>,
        initial_state: ReservoirState,
    ) -> PyResult<ModelInputs> {
        Ok(ModelInputs {
            temp: contiguous_slice(&self.temp)?.to_vec(),
            prec: contiguous_slice(&self.prec)?.to_vec(),
            month: months(self.month),
            pe_m: contiguous_slice(&self.pe_m)?.to_vec(),
            t_m: contiguous_slice(&self.t_m)?.to_vec(),
            qobs: qobs.map(<[f64]>::to_vec),
            initial_state,
        })
    }
}

/// Row-major 2-D array with a fixed column count, also when `rows` is empty.
pub fn matrix<'py>(
    py: Python<'py>,
    rows: &[Vec<f64>],
    ncols: usize,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    PyArray1::from_vec(py, flat).reshape([rows.len(), ncols])
}
