//! Calibration settings.
//!
//! Loadable from TOML (every field optional) or built with the `with_*`
//! methods:
//!
//! ```toml
//! seed = 42
//! objective = "mse"
//! parallel = true
//!
//! [differential_evolution]
//! max_iter = 300
//! popsize = 15
//! mutation = 0.7
//! recombination = 0.7
//! tol = 0.01
//! strategy = "best1bin"
//! init = "latin_hypercube"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::HbvError;
use crate::metrics::Objective;

/// Top-level calibration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Quantity minimised by `fit`.
    pub objective: Objective,
    /// Evaluate independent trials on the rayon thread pool.
    pub parallel: bool,
    /// Differential-evolution settings.
    pub differential_evolution: DifferentialEvolutionConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            objective: Objective::Mse,
            parallel: true,
            differential_evolution: DifferentialEvolutionConfig::default(),
        }
    }
}

impl CalibrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, HbvError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_differential_evolution(mut self, de: DifferentialEvolutionConfig) -> Self {
        self.differential_evolution = de;
        self
    }

    /// Reject settings the optimiser cannot run with.
    pub fn validate(&self) -> Result<(), HbvError> {
        self.differential_evolution.validate()
    }
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `v = x_r1 + F (x_r2 - x_r3)`, binomial crossover.
    #[default]
    #[serde(rename = "rand1bin")]
    Rand1Bin,
    /// `v = x_best + F (x_r1 - x_r2)`, binomial crossover.
    #[serde(rename = "best1bin")]
    Best1Bin,
}

/// Initial population layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Init {
    /// Independent uniform draws.
    #[default]
    Uniform,
    /// One draw per stratum in every dimension.
    LatinHypercube,
}

/// Differential-evolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DifferentialEvolutionConfig {
    /// Maximum number of generations.
    pub max_iter: usize,
    /// Population size multiplier: population = `popsize * dim`.
    pub popsize: usize,
    /// Differential weight `F`, in `(0, 2]`.
    pub mutation: f64,
    /// Crossover probability `CR`, in `[0, 1]`.
    pub recombination: f64,
    /// Relative convergence tolerance on the population's cost spread.
    pub tol: f64,
    /// Absolute convergence tolerance on the population's cost spread.
    pub atol: f64,
    pub strategy: Strategy,
    pub init: Init,
}

impl Default for DifferentialEvolutionConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            popsize: 15,
            mutation: 0.7,
            recombination: 0.7,
            tol: 0.01,
            atol: 0.0,
            strategy: Strategy::Rand1Bin,
            init: Init::Uniform,
        }
    }
}

impl DifferentialEvolutionConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_popsize(mut self, popsize: usize) -> Self {
        self.popsize = popsize;
        self
    }

    pub fn with_mutation(mut self, mutation: f64) -> Self {
        self.mutation = mutation;
        self
    }

    pub fn with_recombination(mut self, recombination: f64) -> Self {
        self.recombination = recombination;
        self
    }

    pub fn with_tol(mut self, tol: f64, atol: f64) -> Self {
        self.tol = tol;
        self.atol = atol;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    pub fn validate(&self) -> Result<(), HbvError> {
        if self.popsize == 0 {
            return Err(HbvError::optimization_settings("popsize must be at least 1"));
        }
        if !(self.mutation > 0.0 && self.mutation <= 2.0) {
            return Err(HbvError::optimization_settings(format!(
                "mutation must be in (0, 2], got {}",
                self.mutation
            )));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(HbvError::optimization_settings(format!(
                "recombination must be in [0, 1], got {}",
                self.recombination
            )));
        }
        if !(self.tol >= 0.0 && self.atol >= 0.0) {
            return Err(HbvError::optimization_settings(
                "tol and atol must be non-negative",
            ));
        }
        Ok(())
    }
}
