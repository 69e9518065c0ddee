use pyo3::create_exception;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use hbvedu_core::HbvError;

create_exception!(hbvedu, InvalidParameterError, PyValueError);
create_exception!(hbvedu, ShapeMismatchError, PyValueError);
create_exception!(hbvedu, InvalidForcingError, PyValueError);
create_exception!(hbvedu, InvalidConfigurationError, PyValueError);
create_exception!(hbvedu, InvalidInputError, PyValueError);
create_exception!(hbvedu, RuntimeOptimizationError, PyRuntimeError);

/// Map a core error onto its Python exception class.
pub fn to_py_err(err: HbvError) -> PyErr {
    let msg = err.to_string();
    match err {
        HbvError::InvalidParameter { .. } => InvalidParameterError::new_err(msg),
        HbvError::ShapeMismatch { .. } => ShapeMismatchError::new_err(msg),
        HbvError::InvalidForcing(_) => InvalidForcingError::new_err(msg),
        HbvError::InvalidConfiguration(_) | HbvError::Config(_) => {
            InvalidConfigurationError::new_err(msg)
        }
        HbvError::InvalidInput(_) => InvalidInputError::new_err(msg),
        HbvError::RuntimeOptimization { .. } => RuntimeOptimizationError::new_err(msg),
    }
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add("InvalidParameterError", py.get_type::<InvalidParameterError>())?;
    m.add("ShapeMismatchError", py.get_type::<ShapeMismatchError>())?;
    m.add("InvalidForcingError", py.get_type::<InvalidForcingError>())?;
    m.add(
        "InvalidConfigurationError",
        py.get_type::<InvalidConfigurationError>(),
    )?;
    m.add("InvalidInputError", py.get_type::<InvalidInputError>())?;
    m.add(
        "RuntimeOptimizationError",
        py.get_type::<RuntimeOptimizationError>(),
    )?;
    Ok(())
}
