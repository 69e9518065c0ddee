//! Goodness-of-fit metrics and calibration objectives.
//!
//! Every metric takes `(observed, simulated)` slices of equal length and
//! returns a scalar. Callers are responsible for the length check.

use serde::{Deserialize, Serialize};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squared_error(observed: &[f64], simulated: &[f64]) -> f64 {
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum()
}

/// Mean Squared Error. Range: [0, inf), 0 = perfect.
pub fn mse(observed: &[f64], simulated: &[f64]) -> f64 {
    sum_squared_error(observed, simulated) / observed.len() as f64
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    mse(observed, simulated).sqrt()
}

/// Mean Absolute Error. Range: [0, inf), 0 = perfect.
pub fn mae(observed: &[f64], simulated: &[f64]) -> f64 {
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).abs())
        .sum::<f64>()
        / observed.len() as f64
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
///
/// `1 - sum((obs - sim)^2) / sum((obs - mean(obs))^2)`; a constant observed
/// series has no variance to explain and yields `-inf`.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let mean_obs = mean(observed);
    let variance: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if variance == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - sum_squared_error(observed, simulated) / variance
}

/// NSE on `ln(q + 0.01)`, emphasising low flows.
pub fn log_nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let log = |v: &[f64]| -> Vec<f64> { v.iter().map(|x| (x + 0.01).ln()).collect() };
    nse(&log(observed), &log(simulated))
}

/// Kling-Gupta Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn kge(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mean_o = mean(observed);
    let mean_s = mean(simulated);
    let std_o = (observed.iter().map(|o| (o - mean_o).powi(2)).sum::<f64>() / n).sqrt();
    let std_s = (simulated.iter().map(|s| (s - mean_s).powi(2)).sum::<f64>() / n).sqrt();

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        observed
            .iter()
            .zip(simulated)
            .map(|(o, s)| (o - mean_o) * (s - mean_s))
            .sum::<f64>()
            / (n * std_o * std_s)
    };
    let alpha = if std_o == 0.0 { 0.0 } else { std_s / std_o };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };

    1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt()
}

/// Percent Bias. Optimal = 0, positive = overestimation.
pub fn pbias(observed: &[f64], simulated: &[f64]) -> f64 {
    let sum_obs: f64 = observed.iter().sum();
    if sum_obs == 0.0 {
        return f64::INFINITY;
    }
    let diff: f64 = simulated.iter().zip(observed).map(|(s, o)| s - o).sum();
    100.0 * diff / sum_obs
}

/// Calibration objective: a metric turned into a quantity to minimise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Mean squared error.
    #[default]
    Mse,
    /// Root mean square error.
    Rmse,
    /// `1 - NSE`.
    Nse,
    /// `1 - KGE`.
    Kge,
}

impl Objective {
    /// Loss to minimise. Non-finite losses map to `+inf`.
    pub fn loss(self, observed: &[f64], simulated: &[f64]) -> f64 {
        let value = match self {
            Objective::Mse => mse(observed, simulated),
            Objective::Rmse => rmse(observed, simulated),
            Objective::Nse => 1.0 - nse(observed, simulated),
            Objective::Kge => 1.0 - kge(observed, simulated),
        };
        if value.is_finite() {
            value
        } else {
            f64::INFINITY
        }
    }
}
