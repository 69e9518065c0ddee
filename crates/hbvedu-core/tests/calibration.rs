use hbvedu_core::calibration::{
    fit, monte_carlo, CalibrationConfig, DifferentialEvolutionConfig, Strategy,
};
use hbvedu_core::forcing::ModelInputs;
use hbvedu_core::hbv_edu::{HbvModel, ParameterSpace, Parameters, ReservoirState};
use hbvedu_core::metrics::{self, Objective};
use hbvedu_core::HbvError;

fn truth() -> Parameters {
    Parameters::new(0.5, 2.5, 220.0, 2.5, 0.05, 110.0, 0.15, 0.06, 0.03, 0.08, 15.0).unwrap()
}

fn inputs(n: usize) -> ModelInputs {
    ModelInputs {
        temp: (0..n)
            .map(|i| 5.0 + 11.0 * ((i as f64 - 100.0) * 2.0 * std::f64::consts::PI / 365.0).sin())
            .collect(),
        prec: (0..n)
            .map(|i| match (i * 7) % 11 {
                0 => 22.0,
                3 => 8.0,
                5 => 2.5,
                _ => 0.0,
            })
            .collect(),
        month: (0..n).map(|i| ((i % 365) / 31).min(11) as u8 + 1).collect(),
        pe_m: vec![0.2, 0.4, 1.0, 2.0, 3.2, 4.2, 4.6, 3.8, 2.4, 1.2, 0.5, 0.2],
        t_m: vec![-6.0, -5.0, 0.0, 5.0, 10.0, 14.0, 16.0, 15.0, 11.0, 5.0, 0.0, -4.0],
        qobs: None,
        initial_state: ReservoirState::new(0.0, 120.0, 5.0, 30.0).unwrap(),
    }
}

/// Model whose space pins every parameter except FC, Beta and K_2 to the truth.
fn three_parameter_model() -> HbvModel {
    let t = truth();
    let mut space = ParameterSpace::new();
    for (name, value) in t.to_named() {
        if !matches!(name, "FC" | "Beta" | "K_2") {
            space = space.with_fixed(name, value).unwrap();
        }
    }
    HbvModel::new(180.0).unwrap().with_space(space)
}

#[test]
fn fit_recovers_synthetic_discharge() {
    let model = three_parameter_model();
    let data = inputs(365);
    let observed = model.simulate(&truth(), &data).unwrap();

    let config = CalibrationConfig::new().with_seed(42).with_differential_evolution(
        DifferentialEvolutionConfig::default()
            .with_max_iter(150)
            .with_popsize(10),
    );
    let result = fit(&model, Some(observed.as_slice()), &data, &config).unwrap();

    let q = model.simulate(&result.params, &data).unwrap();
    assert!(metrics::nse(&observed, &q) > 0.99, "mse = {}", result.mse);
    assert!(model.space().contains(&result.params));
    assert_eq!(result.params.l, truth().l);
}

#[test]
fn fit_stays_within_bounds_on_full_space() {
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(200);
    let observed = model.simulate(&truth(), &data).unwrap();
    let config = CalibrationConfig::new()
        .with_seed(5)
        .with_differential_evolution(
            DifferentialEvolutionConfig::default()
                .with_max_iter(10)
                .with_popsize(3)
                .with_strategy(Strategy::Best1Bin),
        );
    let result = fit(&model, Some(observed.as_slice()), &data, &config).unwrap();
    assert!(
        model.space().contains(&result.params),
        "{:?}",
        model.space().violations(&result.params)
    );
    assert!(result.best_value.is_finite());
    assert!(result.n_iterations <= 10);
}

#[test]
fn fit_is_reproducible_with_seed() {
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(120);
    let observed = model.simulate(&truth(), &data).unwrap();
    let config = CalibrationConfig::new()
        .with_seed(9)
        .with_objective(Objective::Kge)
        .with_differential_evolution(
            DifferentialEvolutionConfig::default()
                .with_max_iter(5)
                .with_popsize(2),
        );
    let a = fit(&model, Some(observed.as_slice()), &data, &config).unwrap();
    let b = fit(&model, Some(observed.as_slice()), &data, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.objective, Objective::Kge);
}

#[test]
fn fit_with_toml_config() {
    let config = CalibrationConfig::from_toml_str(
        r#"
        seed = 3
        objective = "rmse"
        parallel = false

        [differential_evolution]
        max_iter = 4
        popsize = 2
        init = "latin_hypercube"
        "#,
    )
    .unwrap();
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(90);
    let observed = model.simulate(&truth(), &data).unwrap();
    let result = fit(&model, Some(observed.as_slice()), &data, &config).unwrap();
    assert_eq!(result.objective, Objective::Rmse);
    assert!(model.space().contains(&result.params));
}

#[test]
fn fit_rejects_misaligned_observations() {
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(30);
    let err = fit(
        &model,
        Some(&[1.0; 29][..]),
        &data,
        &CalibrationConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, HbvError::InvalidInput(_)));
}

#[test]
fn fit_rejects_short_monthly_normals() {
    let model = HbvModel::new(180.0).unwrap();
    let mut data = inputs(30);
    data.pe_m.truncate(11);
    let err = fit(
        &model,
        Some(&[1.0; 30][..]),
        &data,
        &CalibrationConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, HbvError::RuntimeOptimization { .. }));
}

#[test]
fn monte_carlo_shapes_with_unit_observations() {
    let model = HbvModel::new(180.0).unwrap();
    let n = 60;
    let data = inputs(n);
    let ones = vec![1.0; n];
    let config = CalibrationConfig::new().with_seed(11);
    let result = monte_carlo(&model, 100, Some(ones.as_slice()), &data, &config).unwrap();

    assert_eq!(result.params.len(), 100);
    assert_eq!(result.param_matrix().len(), 100);
    assert_eq!(result.qsim.len(), 100);
    assert!(result.qsim.iter().all(|q| q.len() == n));
    let mse = result.mse.as_ref().unwrap();
    assert_eq!(mse.len(), 100);
    for (q, m) in result.qsim.iter().zip(mse) {
        assert_eq!(*m, metrics::mse(&ones, q));
    }

    let best = result.best_trial().unwrap();
    assert_eq!(best.discarded, 0);
    assert!(mse.iter().all(|m| *m >= best.mse));
}

#[test]
fn monte_carlo_is_reproducible_with_seed() {
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(40);
    let config = CalibrationConfig::new().with_seed(123);
    let a = monte_carlo(&model, 30, None, &data, &config).unwrap();
    let b = monte_carlo(&model, 30, None, &data, &config.clone().with_parallel(false)).unwrap();
    assert_eq!(a, b);

    let other = monte_carlo(&model, 30, None, &data, &CalibrationConfig::new().with_seed(124))
        .unwrap();
    assert_ne!(a.params, other.params);
}

#[test]
fn monte_carlo_trials_match_direct_simulation() {
    let model = HbvModel::new(180.0).unwrap();
    let data = inputs(45);
    let result = monte_carlo(&model, 5, None, &data, &CalibrationConfig::new().with_seed(2))
        .unwrap();
    for (p, q) in result.params.iter().zip(&result.qsim) {
        assert_eq!(&model.simulate(p, &data).unwrap(), q);
    }
}
