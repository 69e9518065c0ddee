//! Parameter estimation against observed discharge.

use tracing::{info, warn};

use super::config::CalibrationConfig;
use super::differential_evolution::DifferentialEvolution;
use super::optimizer::Minimizer;
use crate::error::HbvError;
use crate::forcing::{ForcingSeries, ModelInputs, MonthlyNormals};
use crate::hbv_edu::constants::N_PARAMS;
use crate::hbv_edu::run::simulate_unchecked;
use crate::hbv_edu::{HbvModel, Parameters};
use crate::metrics::{self, Objective};

/// Outcome of a calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Best parameter set, within the model's bounds.
    pub params: Parameters,
    /// Objective value at `params`.
    pub best_value: f64,
    /// Mean squared error at `params`, whatever the objective.
    pub mse: f64,
    pub objective: Objective,
    /// Whether the optimiser met its convergence criterion.
    pub success: bool,
    pub n_iterations: usize,
    pub n_evaluations: usize,
    pub message: String,
}

/// Observed series: the explicit argument wins over `inputs.qobs`.
pub(crate) fn resolve_observed<'a>(
    observed: Option<&'a [f64]>,
    inputs: &'a ModelInputs,
) -> Option<&'a [f64]> {
    observed.or(inputs.qobs.as_deref())
}

pub(crate) fn check_observed(observed: &[f64], forcing: &ForcingSeries) -> Result<(), HbvError> {
    if observed.len() != forcing.len() {
        return Err(HbvError::InvalidInput(format!(
            "observed discharge has {} values but forcing has {}",
            observed.len(),
            forcing.len()
        )));
    }
    Ok(())
}

/// Calibrate `model` against observed discharge by differential evolution.
///
/// `observed` falls back to `inputs.qobs`. Inputs and settings are checked
/// before the first evaluation: a missing or misaligned observed series is
/// `InvalidInput`, as is a constant series under [`Objective::Nse`].
/// Anything else that prevents the optimiser from starting, or an optimiser
/// result of the wrong dimension, is `RuntimeOptimization`.
pub fn fit(
    model: &HbvModel,
    observed: Option<&[f64]>,
    inputs: &ModelInputs,
    config: &CalibrationConfig,
) -> Result<FitResult, HbvError> {
    let minimizer = DifferentialEvolution::new(config.differential_evolution.clone())
        .with_seed(config.seed)
        .with_parallel(config.parallel);
    fit_with(model, observed, inputs, config.objective, &minimizer)
}

/// [`fit`] with a caller-supplied optimiser.
pub fn fit_with<M: Minimizer>(
    model: &HbvModel,
    observed: Option<&[f64]>,
    inputs: &ModelInputs,
    objective: Objective,
    minimizer: &M,
) -> Result<FitResult, HbvError> {
    let (forcing, normals) = inputs.prepare().map_err(HbvError::optimization)?;
    let observed = resolve_observed(observed, inputs)
        .ok_or_else(|| HbvError::InvalidInput("no observed discharge supplied".into()))?;
    check_observed(observed, &forcing)?;
    if observed.iter().any(|q| !q.is_finite()) {
        return Err(HbvError::InvalidInput(
            "observed discharge contains non-finite values".into(),
        ));
    }
    if objective == Objective::Nse && observed.iter().all(|q| *q == observed[0]) {
        return Err(HbvError::InvalidInput(
            "NSE is undefined for a constant observed series".into(),
        ));
    }

    let space = model.space();
    let simulate = |x: &[f64]| -> Vec<f64> {
        let params = space.to_parameters(x);
        run_trial(model, &params, &forcing, &normals, inputs)
    };

    let outcome = minimizer.minimize(
        |x: &[f64]| objective.loss(observed, &simulate(x)),
        space.bounds(),
    )?;
    if outcome.x.len() != N_PARAMS {
        return Err(HbvError::optimization_settings(format!(
            "optimiser returned {} values, expected {N_PARAMS}",
            outcome.x.len()
        )));
    }

    let params = space.to_parameters(&outcome.x);
    let mse = metrics::mse(observed, &simulate(&outcome.x));

    if outcome.success {
        info!(
            objective = ?objective,
            best = outcome.fun,
            mse,
            iterations = outcome.n_iterations,
            evaluations = outcome.n_evaluations,
            "calibration finished"
        );
    } else {
        warn!(
            objective = ?objective,
            best = outcome.fun,
            iterations = outcome.n_iterations,
            message = %outcome.message,
            "calibration did not converge"
        );
    }

    Ok(FitResult {
        params,
        best_value: outcome.fun,
        mse,
        objective,
        success: outcome.success,
        n_iterations: outcome.n_iterations,
        n_evaluations: outcome.n_evaluations,
        message: outcome.message,
    })
}

/// Discharge for one trial; inputs were validated by the caller.
pub(crate) fn run_trial(
    model: &HbvModel,
    params: &Parameters,
    forcing: &ForcingSeries,
    normals: &MonthlyNormals,
    inputs: &ModelInputs,
) -> Vec<f64> {
    simulate_unchecked(
        params,
        forcing,
        normals,
        model.watershed(),
        &inputs.initial_state,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::config::DifferentialEvolutionConfig;
    use crate::calibration::optimizer::OptimizeOutcome;
    use crate::hbv_edu::ReservoirState;

    fn inputs(n: usize) -> ModelInputs {
        ModelInputs {
            temp: (0..n).map(|i| 5.0 + (i % 7) as f64).collect(),
            prec: (0..n).map(|i| if i % 3 == 0 { 12.0 } else { 0.0 }).collect(),
            month: vec![6; n],
            pe_m: vec![2.0; 12],
            t_m: vec![8.0; 12],
            initial_state: ReservoirState::new(0.0, 100.0, 10.0, 20.0).unwrap(),
            ..Default::default()
        }
    }

    fn quick() -> CalibrationConfig {
        CalibrationConfig::new().with_seed(1).with_differential_evolution(
            DifferentialEvolutionConfig::default()
                .with_max_iter(3)
                .with_popsize(2)
                .with_tol(0.0, 0.0),
        )
    }

    #[test]
    fn observed_length_mismatch_is_invalid_input() {
        let model = HbvModel::new(50.0).unwrap();
        let err = fit(&model, Some(&[1.0; 9][..]), &inputs(10), &quick()).unwrap_err();
        assert!(matches!(err, HbvError::InvalidInput(_)));
    }

    #[test]
    fn missing_observed_is_invalid_input() {
        let model = HbvModel::new(50.0).unwrap();
        let err = fit(&model, None, &inputs(10), &quick()).unwrap_err();
        assert!(matches!(err, HbvError::InvalidInput(_)));
    }

    #[test]
    fn bad_monthly_normals_fail_before_optimising() {
        let model = HbvModel::new(50.0).unwrap();
        let mut bad = inputs(10);
        bad.pe_m.pop();
        let err = fit(&model, Some(&[1.0; 10][..]), &bad, &quick()).unwrap_err();
        assert!(matches!(
            err,
            HbvError::RuntimeOptimization {
                source: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn forcing_mismatch_fails_before_optimising() {
        let model = HbvModel::new(50.0).unwrap();
        let mut bad = inputs(10);
        bad.temp.push(1.0);
        let err = fit(&model, Some(&[1.0; 10][..]), &bad, &quick()).unwrap_err();
        assert!(matches!(err, HbvError::RuntimeOptimization { .. }));
    }

    #[test]
    fn invalid_settings_fail() {
        let model = HbvModel::new(50.0).unwrap();
        let mut config = quick();
        config.differential_evolution.mutation = 0.0;
        let err = fit(&model, Some(&[1.0; 10][..]), &inputs(10), &config).unwrap_err();
        assert!(matches!(err, HbvError::RuntimeOptimization { .. }));
    }

    #[test]
    fn constant_observed_rejected_for_nse() {
        let model = HbvModel::new(50.0).unwrap();
        let data = inputs(10);
        let err = fit_with(
            &model,
            Some(&[2.0; 10][..]),
            &data,
            Objective::Nse,
            &DifferentialEvolution::new(DifferentialEvolutionConfig::default()),
        )
        .unwrap_err();
        assert!(matches!(err, HbvError::InvalidInput(_)));

        let config = quick().with_objective(Objective::Kge);
        assert!(fit(&model, Some(&[2.0; 10][..]), &data, &config).is_ok());
    }

    struct Truncating;

    impl Minimizer for Truncating {
        fn minimize<F>(&self, objective: F, bounds: &[(f64, f64)]) -> Result<OptimizeOutcome, HbvError>
        where
            F: Fn(&[f64]) -> f64 + Sync,
        {
            let x: Vec<f64> = bounds.iter().take(3).map(|b| b.0).collect();
            Ok(OptimizeOutcome {
                fun: objective(&x),
                x,
                success: true,
                n_iterations: 1,
                n_evaluations: 1,
                message: String::new(),
            })
        }
    }

    #[test]
    fn short_optimiser_result_is_rejected() {
        let model = HbvModel::new(50.0).unwrap();
        let err = fit_with(
            &model,
            Some(&[1.0; 10][..]),
            &inputs(10),
            Objective::Mse,
            &Truncating,
        )
        .unwrap_err();
        assert!(matches!(err, HbvError::RuntimeOptimization { source: None, .. }));
    }

    #[test]
    fn uses_qobs_from_inputs() {
        let model = HbvModel::new(50.0).unwrap();
        let mut with_obs = inputs(20);
        with_obs.qobs = Some(vec![1.0; 20]);
        let result = fit(&model, None, &with_obs, &quick()).unwrap();
        assert!(model.space().contains(&result.params));
        assert_eq!(result.n_evaluations, 2 * 11 * 4);
        assert!(result.mse.is_finite());
    }

    #[test]
    fn best_value_matches_reported_params() {
        let model = HbvModel::new(50.0).unwrap();
        let data = inputs(30);
        let observed = vec![0.5; 30];
        let result = fit(&model, Some(observed.as_slice()), &data, &quick()).unwrap();
        let q = model.simulate(&result.params, &data).unwrap();
        assert_eq!(result.best_value, metrics::mse(&observed, &q));
        assert_eq!(result.best_value, result.mse);
    }
}
