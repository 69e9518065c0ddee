/// Calibration drivers: differential-evolution fitting and Monte-Carlo
/// sampling over a model's parameter space.
pub mod config;
pub mod differential_evolution;
pub mod fit;
pub mod monte_carlo;
pub mod optimizer;

pub use config::{CalibrationConfig, DifferentialEvolutionConfig, Init, Strategy};
pub use differential_evolution::DifferentialEvolution;
pub use fit::{fit, fit_with, FitResult};
pub use monte_carlo::{monte_carlo, BestTrial, MonteCarloResult};
pub use optimizer::{Minimizer, OptimizeOutcome};
