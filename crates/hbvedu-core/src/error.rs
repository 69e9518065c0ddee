//! Error types for hbvedu-core.

/// Error type for every fallible operation in the crate.
///
/// Validation errors are raised before any simulation or optimisation work
/// starts. Numerical problems during a run (NaN, overflow) are not errors:
/// they propagate into the output series.
#[derive(Debug, thiserror::Error)]
pub enum HbvError {
    /// A parameter is missing, unknown, non-finite, or has invalid bounds.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Canonical parameter name (or the offending key).
        name: String,
        /// Human readable cause.
        reason: String,
    },

    /// Forcing arrays have different lengths.
    #[error("{left} has {left_len} values but {right} has {right_len}")]
    ShapeMismatch {
        /// Name of the reference array.
        left: &'static str,
        /// Length of the reference array.
        left_len: usize,
        /// Name of the mismatching array.
        right: &'static str,
        /// Length of the mismatching array.
        right_len: usize,
    },

    /// Forcing content is unusable (empty series, month out of range).
    #[error("invalid forcing: {0}")]
    InvalidForcing(String),

    /// Monthly normals, watershed or initial state are malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Observed discharge does not line up with the forcing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The optimiser rejected its inputs or settings before starting.
    #[error("optimisation could not start: {reason}")]
    RuntimeOptimization {
        /// Human readable cause.
        reason: String,
        /// Underlying validation error, if any.
        #[source]
        source: Option<Box<HbvError>>,
    },

    /// A TOML calibration configuration could not be parsed.
    #[error("failed to parse calibration config: {0}")]
    Config(#[from] toml::de::Error),
}

impl HbvError {
    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a validation error raised while preparing an optimisation run.
    pub(crate) fn optimization(source: HbvError) -> Self {
        Self::RuntimeOptimization {
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn optimization_settings(reason: impl Into<String>) -> Self {
        Self::RuntimeOptimization {
            reason: reason.into(),
            source: None,
        }
    }
}
