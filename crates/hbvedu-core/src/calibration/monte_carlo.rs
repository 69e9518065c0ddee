//! Monte-Carlo sampling of the parameter space.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, warn};

use super::config::CalibrationConfig;
use super::fit::{check_observed, resolve_observed, run_trial};
use crate::error::HbvError;
use crate::forcing::ModelInputs;
use crate::hbv_edu::constants::N_PARAMS;
use crate::hbv_edu::{HbvModel, Parameters};
use crate::metrics;

/// Every trial of a Monte-Carlo run, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonteCarloResult {
    /// One parameter set per trial.
    pub params: Vec<Parameters>,
    /// Simulated discharge per trial; each as long as the forcing.
    pub qsim: Vec<Vec<f64>>,
    /// MSE per trial when observed discharge was supplied. NaN marks a
    /// trial whose simulation produced non-finite values.
    pub mse: Option<Vec<f64>>,
}

/// Lowest-MSE trial of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BestTrial {
    pub index: usize,
    pub mse: f64,
    pub params: Parameters,
    /// Trials skipped because their MSE was NaN.
    pub discarded: usize,
}

impl MonteCarloResult {
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter sets as rows in canonical order.
    pub fn param_matrix(&self) -> Vec<[f64; N_PARAMS]> {
        self.params.iter().map(Parameters::to_array).collect()
    }

    /// Trial with the lowest MSE, ignoring NaN trials.
    ///
    /// `None` without observed discharge or when every trial is NaN.
    pub fn best_trial(&self) -> Option<BestTrial> {
        let mse = self.mse.as_ref()?;
        let discarded = mse.iter().filter(|v| v.is_nan()).count();
        if discarded > 0 {
            warn!(
                discarded,
                total = mse.len(),
                "ignoring Monte-Carlo trials with non-finite discharge"
            );
        }
        let (index, &best) = mse
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|a, b| a.1.total_cmp(b.1))?;
        Some(BestTrial {
            index,
            mse: best,
            params: self.params[index],
            discarded,
        })
    }
}

/// Run `num_samples` random parameter sets through the model.
///
/// Parameter sets are drawn sequentially from one generator seeded by
/// `config.seed`, so the draws do not depend on `config.parallel`.
/// `observed` falls back to `inputs.qobs`; without either, `mse` is `None`.
pub fn monte_carlo(
    model: &HbvModel,
    num_samples: usize,
    observed: Option<&[f64]>,
    inputs: &ModelInputs,
    config: &CalibrationConfig,
) -> Result<MonteCarloResult, HbvError> {
    let (forcing, normals) = inputs.prepare()?;
    let observed = resolve_observed(observed, inputs);
    if let Some(obs) = observed {
        check_observed(obs, &forcing)?;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let params: Vec<Parameters> = (0..num_samples)
        .map(|_| model.random_parameters(&mut rng))
        .collect();

    let trial = |p: &Parameters| run_trial(model, p, &forcing, &normals, inputs);
    let qsim: Vec<Vec<f64>> = if config.parallel {
        params.par_iter().map(trial).collect()
    } else {
        params.iter().map(trial).collect()
    };

    let mse = observed.map(|obs| {
        qsim.iter()
            .map(|q| {
                if q.iter().all(|v| v.is_finite()) {
                    metrics::mse(obs, q)
                } else {
                    f64::NAN
                }
            })
            .collect::<Vec<f64>>()
    });

    info!(
        samples = num_samples,
        days = forcing.len(),
        scored = mse.is_some(),
        "Monte-Carlo run finished"
    );

    Ok(MonteCarloResult { params, qsim, mse })
}
