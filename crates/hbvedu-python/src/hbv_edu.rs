use std::collections::HashMap;

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hbvedu_core::forcing::{DailyForcing, MonthlyNormals, WatershedConfig};
use hbvedu_core::hbv_edu::constants::{PARAM_BOUNDS, PARAM_NAMES};
use hbvedu_core::hbv_edu::run::{step as step_day, StepContext};
use hbvedu_core::hbv_edu::HbvModel;
use hbvedu_core::HbvError;

use crate::convert::{self, checked_slice, Forcing};
use crate::errors::to_py_err;

define_timeseries_result! {
    /// HBV-Educational run results with typed numpy array attributes.
    pub struct HbvResult from hbvedu_core::hbv_edu::FluxesTimeseries {
        temp, prec, pet, rain, snowfall, melt, snow, soil_input, recharge,
        actual_et, soil_moisture, q0, q1, percolation, q2, s1, s2, runoff,
        discharge,
    }
}

define_step_result! {
    /// HBV-Educational single-day flux results.
    pub struct HbvStepFluxes from hbvedu_core::hbv_edu::Fluxes {
        temp, prec, pet, rain, snowfall, melt, snow, soil_input, recharge,
        actual_et, soil_moisture, q0, q1, percolation, q2, s1, s2, runoff,
        discharge,
    }
}

/// Simulated discharge [m3/s], one value per day.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (params, temp, prec, month, pe_m, t_m, area_km2, initial_state=None))]
fn simulate<'py>(
    py: Python<'py>,
    params: HashMap<String, f64>,
    temp: PyReadonlyArray1<'py, f64>,
    prec: PyReadonlyArray1<'py, f64>,
    month: Vec<i64>,
    pe_m: PyReadonlyArray1<'py, f64>,
    t_m: PyReadonlyArray1<'py, f64>,
    area_km2: f64,
    initial_state: Option<HashMap<String, f64>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let p = convert::parameters(&params)?;
    let state = convert::reservoir_state(initial_state.as_ref())?;
    let inputs = Forcing { temp, prec, month, pe_m, t_m }.into_inputs(None, state)?;
    let model = HbvModel::new(area_km2).map_err(to_py_err)?;

    let q = py
        .allow_threads(|| model.simulate(&p, &inputs))
        .map_err(to_py_err)?;
    Ok(PyArray1::from_vec(py, q))
}

/// Run HBV-Educational over a timeseries.
///
/// Returns (HbvResult, final_state_dict).
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (params, temp, prec, month, pe_m, t_m, area_km2, initial_state=None))]
fn run<'py>(
    py: Python<'py>,
    params: HashMap<String, f64>,
    temp: PyReadonlyArray1<'py, f64>,
    prec: PyReadonlyArray1<'py, f64>,
    month: Vec<i64>,
    pe_m: PyReadonlyArray1<'py, f64>,
    t_m: PyReadonlyArray1<'py, f64>,
    area_km2: f64,
    initial_state: Option<HashMap<String, f64>>,
) -> PyResult<(HbvResult, Bound<'py, PyDict>)> {
    let p = convert::parameters(&params)?;
    let state = convert::reservoir_state(initial_state.as_ref())?;
    let inputs = Forcing { temp, prec, month, pe_m, t_m }.into_inputs(None, state)?;
    let model = HbvModel::new(area_km2).map_err(to_py_err)?;

    let (ts, final_state) = py
        .allow_threads(|| model.run(&p, &inputs))
        .map_err(to_py_err)?;
    Ok((
        HbvResult::from_timeseries(py, ts),
        convert::state_dict(py, &final_state)?,
    ))
}

/// Execute one day of HBV-Educational.
///
/// Returns (new_state_dict, HbvStepFluxes).
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (state, params, temp, prec, month, pe_m, t_m, area_km2))]
fn step<'py>(
    py: Python<'py>,
    state: Option<HashMap<String, f64>>,
    params: HashMap<String, f64>,
    temp: f64,
    prec: f64,
    month: u8,
    pe_m: PyReadonlyArray1<'py, f64>,
    t_m: PyReadonlyArray1<'py, f64>,
    area_km2: f64,
) -> PyResult<(Bound<'py, PyDict>, HbvStepFluxes)> {
    let p = convert::parameters(&params)?;
    let s = convert::reservoir_state(state.as_ref())?;
    if !(1..=12).contains(&month) {
        return Err(to_py_err(HbvError::InvalidForcing(format!(
            "month must be in 1..=12, got {month}"
        ))));
    }
    let t_m = checked_slice(&t_m, 12, "t_m")?;
    let pe_m = checked_slice(&pe_m, 12, "pe_m")?;
    let normals = MonthlyNormals::new(t_m, pe_m).map_err(to_py_err)?;
    let context = StepContext {
        normals,
        watershed: WatershedConfig::new(area_km2).map_err(to_py_err)?,
    };

    let day = DailyForcing { temp, prec, month };
    let (new_state, fluxes) = step_day(&s, &p, &day, &context);
    Ok((
        convert::state_dict(py, &new_state)?,
        HbvStepFluxes::from_fluxes(&fluxes),
    ))
}

/// Draw `n` parameter sets uniformly within the bounds.
#[pyfunction]
#[pyo3(signature = (n, seed=None, bounds=None))]
fn sample_parameters<'py>(
    py: Python<'py>,
    n: usize,
    seed: Option<u64>,
    bounds: Option<HashMap<String, (f64, f64)>>,
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let space = convert::space(bounds.as_ref())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    (0..n)
        .map(|_| convert::params_dict(py, &space.sample(&mut rng)))
        .collect()
}

/// Canonical parameter names, in array order.
#[pyfunction]
fn param_names() -> Vec<&'static str> {
    PARAM_NAMES.to_vec()
}

/// Default calibration bounds as `{name: (lower, upper)}`.
#[pyfunction]
fn param_bounds() -> HashMap<&'static str, (f64, f64)> {
    PARAM_NAMES.iter().copied().zip(PARAM_BOUNDS.iter().copied()).collect()
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "hbv_edu")?;
    m.add_function(wrap_pyfunction!(simulate, &m)?)?;
    m.add_function(wrap_pyfunction!(run, &m)?)?;
    m.add_function(wrap_pyfunction!(step, &m)?)?;
    m.add_function(wrap_pyfunction!(sample_parameters, &m)?)?;
    m.add_function(wrap_pyfunction!(param_names, &m)?)?;
    m.add_function(wrap_pyfunction!(param_bounds, &m)?)?;
    m.add_class::<HbvResult>()?;
    m.add_class::<HbvStepFluxes>()?;
    parent.add_submodule(&m)?;
    Ok(())
}
