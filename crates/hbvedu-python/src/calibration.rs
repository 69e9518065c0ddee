use std::collections::HashMap;

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing::debug;

use hbvedu_core::calibration::{self, CalibrationConfig};
use hbvedu_core::hbv_edu::constants::N_PARAMS;
use hbvedu_core::hbv_edu::HbvModel;
use hbvedu_core::metrics::Objective;

use crate::convert::{self, contiguous_slice, Forcing};
use crate::errors::to_py_err;

/// TOML settings, then keyword overrides.
fn build_config(
    config: Option<&str>,
    seed: Option<u64>,
    objective: Option<&str>,
    max_iter: Option<usize>,
    popsize: Option<usize>,
    parallel: Option<bool>,
) -> PyResult<CalibrationConfig> {
    let mut cfg = match config {
        Some(src) => CalibrationConfig::from_toml_str(src).map_err(to_py_err)?,
        None => CalibrationConfig::default(),
    };
    if let Some(seed) = seed {
        cfg.seed = Some(seed);
    }
    if let Some(name) = objective {
        cfg.objective = match name.to_ascii_lowercase().as_str() {
            "mse" => Objective::Mse,
            "rmse" => Objective::Rmse,
            "nse" => Objective::Nse,
            "kge" => Objective::Kge,
            other => {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "unknown objective {other:?}; expected mse, rmse, nse or kge"
                )))
            }
        };
    }
    if let Some(max_iter) = max_iter {
        cfg.differential_evolution.max_iter = max_iter;
    }
    if let Some(popsize) = popsize {
        cfg.differential_evolution.popsize = popsize;
    }
    if let Some(parallel) = parallel {
        cfg.parallel = parallel;
    }
    cfg.validate().map_err(to_py_err)?;
    Ok(cfg)
}

/// Calibrate against observed discharge by differential evolution.
///
/// Returns a dict with `params`, `best_value`, `mse`, `success`,
/// `n_iterations`, `n_evaluations` and `message`.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (
    qobs,
    temp,
    prec,
    month,
    pe_m,
    t_m,
    area_km2,
    initial_state=None,
    bounds=None,
    config=None,
    seed=None,
    objective=None,
    max_iter=None,
    popsize=None,
    parallel=None,
))]
fn fit<'py>(
    py: Python<'py>,
    qobs: PyReadonlyArray1<'py, f64>,
    temp: PyReadonlyArray1<'py, f64>,
    prec: PyReadonlyArray1<'py, f64>,
    month: Vec<i64>,
    pe_m: PyReadonlyArray1<'py, f64>,
    t_m: PyReadonlyArray1<'py, f64>,
    area_km2: f64,
    initial_state: Option<HashMap<String, f64>>,
    bounds: Option<HashMap<String, (f64, f64)>>,
    config: Option<String>,
    seed: Option<u64>,
    objective: Option<String>,
    max_iter: Option<usize>,
    popsize: Option<usize>,
    parallel: Option<bool>,
) -> PyResult<Bound<'py, PyDict>> {
    let cfg = build_config(
        config.as_deref(),
        seed,
        objective.as_deref(),
        max_iter,
        popsize,
        parallel,
    )?;
    let observed = contiguous_slice(&qobs)?;
    let state = convert::reservoir_state(initial_state.as_ref())?;
    let inputs = Forcing { temp, prec, month, pe_m, t_m }.into_inputs(None, state)?;
    let model = HbvModel::new(area_km2)
        .map_err(to_py_err)?
        .with_space(convert::space(bounds.as_ref())?);
    debug!(days = inputs.temp.len(), ?cfg, "fit requested from Python");

    let result = py
        .allow_threads(|| calibration::fit(&model, Some(observed), &inputs, &cfg))
        .map_err(to_py_err)?;

    let dict = PyDict::new(py);
    dict.set_item("params", convert::params_dict(py, &result.params)?)?;
    dict.set_item("best_value", result.best_value)?;
    dict.set_item("mse", result.mse)?;
    dict.set_item("success", result.success)?;
    dict.set_item("n_iterations", result.n_iterations)?;
    dict.set_item("n_evaluations", result.n_evaluations)?;
    dict.set_item("message", result.message)?;
    Ok(dict)
}

/// Run `num_samples` random parameter sets.
///
/// Returns a dict with `params` (num_samples x 11), `qsim`
/// (num_samples x days), `mse` (None without `qobs`) and `best_index`.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (
    num_samples,
    temp,
    prec,
    month,
    pe_m,
    t_m,
    area_km2,
    qobs=None,
    initial_state=None,
    bounds=None,
    seed=None,
    parallel=None,
))]
fn monte_carlo<'py>(
    py: Python<'py>,
    num_samples: usize,
    temp: PyReadonlyArray1<'py, f64>,
    prec: PyReadonlyArray1<'py, f64>,
    month: Vec<i64>,
    pe_m: PyReadonlyArray1<'py, f64>,
    t_m: PyReadonlyArray1<'py, f64>,
    area_km2: f64,
    qobs: Option<PyReadonlyArray1<'py, f64>>,
    initial_state: Option<HashMap<String, f64>>,
    bounds: Option<HashMap<String, (f64, f64)>>,
    seed: Option<u64>,
    parallel: Option<bool>,
) -> PyResult<Bound<'py, PyDict>> {
    let cfg = build_config(None, seed, None, None, None, parallel)?;
    let observed = qobs.as_ref().map(contiguous_slice).transpose()?;
    let state = convert::reservoir_state(initial_state.as_ref())?;
    let inputs = Forcing { temp, prec, month, pe_m, t_m }.into_inputs(None, state)?;
    let days = inputs.temp.len();
    let model = HbvModel::new(area_km2)
        .map_err(to_py_err)?
        .with_space(convert::space(bounds.as_ref())?);

    let result = py
        .allow_threads(|| calibration::monte_carlo(&model, num_samples, observed, &inputs, &cfg))
        .map_err(to_py_err)?;

    let param_rows: Vec<Vec<f64>> = result.param_matrix().iter().map(|r| r.to_vec()).collect();
    let dict = PyDict::new(py);
    dict.set_item("params", convert::matrix(py, &param_rows, N_PARAMS)?)?;
    dict.set_item("qsim", convert::matrix(py, &result.qsim, days)?)?;
    dict.set_item(
        "best_index",
        result.best_trial().map(|best| best.index),
    )?;
    match result.mse {
        Some(mse) => dict.set_item("mse", PyArray1::from_vec(py, mse))?,
        None => dict.set_item("mse", py.None())?,
    }
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "calibration")?;
    m.add_function(wrap_pyfunction!(fit, &m)?)?;
    m.add_function(wrap_pyfunction!(monte_carlo, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
