//! Optimiser seam: anything that minimises a scalar function over a box.

use crate::error::HbvError;

/// Result of a bounded minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOutcome {
    /// Best point found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Whether the convergence criterion was met.
    pub success: bool,
    /// Completed generations or iterations.
    pub n_iterations: usize,
    /// Objective evaluations performed.
    pub n_evaluations: usize,
    pub message: String,
}

/// Bounded, derivative-free minimiser.
///
/// `objective` must be `Sync` so implementations may evaluate candidates
/// in parallel. Non-finite objective values are treated as `+inf`.
pub trait Minimizer {
    fn minimize<F>(&self, objective: F, bounds: &[(f64, f64)]) -> Result<OptimizeOutcome, HbvError>
    where
        F: Fn(&[f64]) -> f64 + Sync;
}

/// Reject empty, non-finite or inverted bounds.
pub(crate) fn check_bounds(bounds: &[(f64, f64)]) -> Result<(), HbvError> {
    if bounds.is_empty() {
        return Err(HbvError::optimization_settings("no dimensions to optimise"));
    }
    for (i, &(lo, hi)) in bounds.iter().enumerate() {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(HbvError::optimization_settings(format!(
                "bounds of dimension {i} are invalid: [{lo}, {hi}]"
            )));
        }
    }
    Ok(())
}
