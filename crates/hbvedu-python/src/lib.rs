#[macro_use]
mod macros;
mod convert;
mod errors;

mod calibration;
mod hbv_edu;
mod metrics;

use pyo3::prelude::*;

/// Register a submodule in sys.modules so `from parent.child import ...` works.
fn register_submodule(py: Python<'_>, parent_name: &str, child: &Bound<'_, PyModule>) -> PyResult<()> {
    let child_name = child.name()?;
    let full_name = format!("{}.{}", parent_name, child_name);
    let sys = py.import("sys")?;
    let modules = sys.getattr("modules")?;
    modules.set_item(full_name, child)?;
    Ok(())
}

#[pyfunction]
fn rust_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Send core log records to stderr. 0 = warn, 1 = info, 2 = debug, 3+ = trace;
/// `RUST_LOG` takes precedence. Returns False if logging was already set up.
#[pyfunction]
#[pyo3(signature = (verbosity=0))]
fn init_logging(verbosity: u8) -> bool {
    hbvedu_core::logging::init(verbosity)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    let parent_name = m.name()?.to_string();

    m.add_function(wrap_pyfunction!(rust_version, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    errors::register(m)?;

    calibration::register(m)?;
    hbv_edu::register(m)?;
    metrics::register(m)?;

    // Register submodules in sys.modules for `from hbvedu._core.X import ...`
    for name in &["calibration", "hbv_edu", "metrics"] {
        let sub = m.getattr(*name)?;
        register_submodule(py, &parent_name, sub.downcast::<PyModule>()?)?;
    }

    Ok(())
}
