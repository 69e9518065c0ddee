/// Generate a frozen `#[pyclass]` struct where each field is a `Py<PyArray1<f64>>`.
///
/// Also generates `from_timeseries()` (moves the columns of a core
/// `FluxesTimeseries`) and a Python-visible `to_dict()`.
macro_rules! define_timeseries_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: Py<numpy::PyArray1<f64>>,
            )+
        }

        impl $name {
            pub fn from_timeseries(py: pyo3::Python<'_>, ts: $core_type) -> Self {
                Self {
                    $(
                        $field: numpy::PyArray1::from_vec(py, ts.$field).unbind(),
                    )+
                }
            }
        }

        #[pyo3::pymethods]
        impl $name {
            /// Columns as a `{name: ndarray}` dict.
            fn to_dict<'py>(
                &self,
                py: pyo3::Python<'py>,
            ) -> pyo3::PyResult<pyo3::Bound<'py, pyo3::types::PyDict>> {
                let dict = pyo3::types::PyDict::new(py);
                $(
                    dict.set_item(stringify!($field), self.$field.clone_ref(py))?;
                )+
                Ok(dict)
            }
        }
    };
}

/// Generate a frozen `#[pyclass]` struct where each field is `f64`.
///
/// Also generates a `from_fluxes()` method that copies values from the
/// corresponding Rust `Fluxes` struct.
macro_rules! define_step_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: f64,
            )+
        }

        impl $name {
            pub fn from_fluxes(f: &$core_type) -> Self {
                Self {
                    $(
                        $field: f.$field,
                    )+
                }
            }
        }
    };
}
