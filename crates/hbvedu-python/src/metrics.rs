use numpy::PyReadonlyArray1;
use pyo3::prelude::*;

use hbvedu_core::metrics;

use crate::convert::{checked_slice, contiguous_slice};

/// Borrow `(observed, simulated)` after checking they line up.
fn pair<'a>(
    observed: &'a PyReadonlyArray1<'a, f64>,
    simulated: &'a PyReadonlyArray1<'a, f64>,
) -> PyResult<(&'a [f64], &'a [f64])> {
    let obs = contiguous_slice(observed)?;
    if obs.is_empty() {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "observed must not be empty",
        ));
    }
    let sim = checked_slice(simulated, obs.len(), "simulated")?;
    Ok((obs, sim))
}

macro_rules! metric_fn {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[pyfunction]
        fn $name<'py>(
            observed: PyReadonlyArray1<'py, f64>,
            simulated: PyReadonlyArray1<'py, f64>,
        ) -> PyResult<f64> {
            let (obs, sim) = pair(&observed, &simulated)?;
            Ok(metrics::$name(obs, sim))
        }
    };
}

metric_fn!(/// Mean squared error.
    mse);
metric_fn!(/// Root mean square error.
    rmse);
metric_fn!(/// Mean absolute error.
    mae);
metric_fn!(/// Nash-Sutcliffe efficiency.
    nse);
metric_fn!(/// NSE on log-transformed flows.
    log_nse);
metric_fn!(/// Kling-Gupta efficiency.
    kge);
metric_fn!(/// Percent bias.
    pbias);

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "metrics")?;
    m.add_function(wrap_pyfunction!(mse, &m)?)?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    m.add_function(wrap_pyfunction!(mae, &m)?)?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(log_nse, &m)?)?;
    m.add_function(wrap_pyfunction!(kge, &m)?)?;
    m.add_function(wrap_pyfunction!(pbias, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
