//! Differential evolution (Storn & Price) over a bounded box.
//!
//! Generations are synchronous: every trial vector of a generation is built
//! from the previous population before any replacement happens. Trial
//! evaluation is therefore independent and may run on the rayon pool
//! without changing the result for a given seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::config::{DifferentialEvolutionConfig, Init, Strategy};
use super::optimizer::{check_bounds, Minimizer, OptimizeOutcome};
use crate::error::HbvError;
use crate::hbv_edu::space::uniform;

/// Smallest population that leaves enough distinct donors for mutation.
const MIN_POPULATION: usize = 5;

#[derive(Debug, Clone)]
pub struct DifferentialEvolution {
    config: DifferentialEvolutionConfig,
    seed: Option<u64>,
    parallel: bool,
}

impl DifferentialEvolution {
    pub fn new(config: DifferentialEvolutionConfig) -> Self {
        Self {
            config,
            seed: None,
            parallel: false,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &DifferentialEvolutionConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn evaluate<F>(&self, objective: &F, points: &[Vec<f64>]) -> Vec<f64>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let cost = |x: &Vec<f64>| finite_or_inf(objective(x));
        if self.parallel {
            points.par_iter().map(cost).collect()
        } else {
            points.iter().map(cost).collect()
        }
    }

    fn trial<R: Rng>(
        &self,
        rng: &mut R,
        population: &[Vec<f64>],
        target: usize,
        best: usize,
        bounds: &[(f64, f64)],
    ) -> Vec<f64> {
        let [r1, r2, r3] = distinct_donors(rng, population.len(), target);
        let f = self.config.mutation;
        let (base, a, b) = match self.config.strategy {
            Strategy::Rand1Bin => (r1, r2, r3),
            Strategy::Best1Bin => (best, r1, r2),
        };

        let dim = bounds.len();
        let forced = rng.random_range(0..dim);
        let parent = &population[target];
        (0..dim)
            .map(|j| {
                let take_mutant = j == forced || rng.random::<f64>() < self.config.recombination;
                let v = if take_mutant {
                    population[base][j] + f * (population[a][j] - population[b][j])
                } else {
                    parent[j]
                };
                let (lo, hi) = bounds[j];
                v.clamp(lo, hi)
            })
            .collect()
    }
}

impl Minimizer for DifferentialEvolution {
    fn minimize<F>(&self, objective: F, bounds: &[(f64, f64)]) -> Result<OptimizeOutcome, HbvError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.config.validate()?;
        check_bounds(bounds)?;

        let mut rng = self.rng();
        let size = (self.config.popsize * bounds.len()).max(MIN_POPULATION);
        let mut population = match self.config.init {
            Init::Uniform => init_uniform(&mut rng, size, bounds),
            Init::LatinHypercube => init_latin_hypercube(&mut rng, size, bounds),
        };
        let mut costs = self.evaluate(&objective, &population);
        let mut n_evaluations = size;
        let mut best = argmin(&costs);

        let mut converged = has_converged(&costs, self.config.tol, self.config.atol);
        let mut n_iterations = 0;
        while !converged && n_iterations < self.config.max_iter {
            let trials: Vec<Vec<f64>> = (0..size)
                .map(|i| self.trial(&mut rng, &population, i, best, bounds))
                .collect();
            let trial_costs = self.evaluate(&objective, &trials);
            n_evaluations += size;

            for (i, (trial, cost)) in trials.into_iter().zip(trial_costs).enumerate() {
                if cost <= costs[i] {
                    population[i] = trial;
                    costs[i] = cost;
                }
            }
            best = argmin(&costs);
            n_iterations += 1;
            converged = has_converged(&costs, self.config.tol, self.config.atol);

            debug!(
                generation = n_iterations,
                best = costs[best],
                "differential evolution generation"
            );
        }

        let message = if converged {
            "population converged".to_string()
        } else {
            warn!(
                max_iter = self.config.max_iter,
                best = costs[best],
                "differential evolution stopped before converging"
            );
            "maximum number of iterations reached".to_string()
        };

        Ok(OptimizeOutcome {
            x: population.swap_remove(best),
            fun: costs[best],
            success: converged,
            n_iterations,
            n_evaluations,
            message,
        })
    }
}

fn finite_or_inf(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}

/// Index of the smallest cost; ties go to the lowest index.
fn argmin(costs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &c) in costs.iter().enumerate().skip(1) {
        if c < costs[best] {
            best = i;
        }
    }
    best
}

/// `std(costs) <= atol + tol * |mean(costs)|`. Never true while any cost is
/// infinite.
fn has_converged(costs: &[f64], tol: f64, atol: f64) -> bool {
    let n = costs.len() as f64;
    let mean = costs.iter().sum::<f64>() / n;
    if !mean.is_finite() {
        return false;
    }
    let std = (costs.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n).sqrt();
    std <= atol + tol * mean.abs()
}

/// Three population indices, distinct from each other and from `exclude`.
fn distinct_donors<R: Rng>(rng: &mut R, size: usize, exclude: usize) -> [usize; 3] {
    let mut picked = [exclude; 3];
    for k in 0..3 {
        loop {
            let candidate = rng.random_range(0..size);
            if candidate != exclude && !picked[..k].contains(&candidate) {
                picked[k] = candidate;
                break;
            }
        }
    }
    picked
}

fn init_uniform<R: Rng>(rng: &mut R, size: usize, bounds: &[(f64, f64)]) -> Vec<Vec<f64>> {
    (0..size)
        .map(|_| bounds.iter().map(|&(lo, hi)| uniform(rng, lo, hi)).collect())
        .collect()
}

/// Each dimension is cut into `size` equal strata; every stratum is used
/// exactly once, in a random order per dimension.
fn init_latin_hypercube<R: Rng>(rng: &mut R, size: usize, bounds: &[(f64, f64)]) -> Vec<Vec<f64>> {
    let mut population = vec![vec![0.0; bounds.len()]; size];
    let mut strata: Vec<usize> = (0..size).collect();
    for (j, &(lo, hi)) in bounds.iter().enumerate() {
        strata.shuffle(rng);
        for (member, &stratum) in population.iter_mut().zip(&strata) {
            let u: f64 = rng.random();
            let v = lo + (hi - lo) * (stratum as f64 + u) / size as f64;
            member[j] = v.min(hi);
        }
    }
    population
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Minimum of 1.0 at (0.5, ..., 0.5).
    fn sphere(x: &[f64]) -> f64 {
        1.0 + x.iter().map(|v| (v - 0.5).powi(2)).sum::<f64>()
    }

    fn tight() -> DifferentialEvolutionConfig {
        DifferentialEvolutionConfig::default()
            .with_max_iter(500)
            .with_tol(1e-10, 0.0)
    }

    fn solver() -> DifferentialEvolution {
        DifferentialEvolution::new(tight()).with_seed(Some(11))
    }

    #[test]
    fn minimises_sphere() {
        let out = solver().minimize(sphere, &[(-5.0, 5.0); 3]).unwrap();
        assert!(out.success, "{}", out.message);
        assert!(out.fun - 1.0 < 1e-6, "fun = {}", out.fun);
        for v in &out.x {
            assert_relative_eq!(*v, 0.5, epsilon = 1e-2);
        }
    }

    #[test]
    fn best1bin_and_lhs_also_converge() {
        let config = tight()
            .with_strategy(Strategy::Best1Bin)
            .with_init(Init::LatinHypercube);
        let out = DifferentialEvolution::new(config)
            .with_seed(Some(3))
            .minimize(sphere, &[(-5.0, 5.0); 2])
            .unwrap();
        assert!(out.fun - 1.0 < 1e-6);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = solver().minimize(sphere, &[(-5.0, 5.0); 2]).unwrap();
        let b = solver().minimize(sphere, &[(-5.0, 5.0); 2]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parallel_matches_serial() {
        let serial = solver().minimize(sphere, &[(-5.0, 5.0); 2]).unwrap();
        let parallel = solver()
            .with_parallel(true)
            .minimize(sphere, &[(-5.0, 5.0); 2])
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn respects_bounds_when_optimum_is_outside() {
        // Unconstrained optimum at 0.5 lies above the box.
        let out = solver().minimize(sphere, &[(-2.0, 0.0); 2]).unwrap();
        for v in &out.x {
            assert!((-2.0..=0.0).contains(v));
            assert_relative_eq!(*v, 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn fixed_dimension_stays_fixed() {
        let out = solver().minimize(sphere, &[(-5.0, 5.0), (2.0, 2.0)]).unwrap();
        assert_eq!(out.x[1], 2.0);
    }

    #[test]
    fn iteration_cap_reports_failure() {
        let config = DifferentialEvolutionConfig::default()
            .with_max_iter(1)
            .with_tol(0.0, 0.0);
        let out = DifferentialEvolution::new(config)
            .with_seed(Some(1))
            .minimize(sphere, &[(-5.0, 5.0); 4])
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.n_iterations, 1);
        assert_eq!(out.n_evaluations, 2 * 15 * 4);
    }

    #[test]
    fn nan_objective_is_never_preferred() {
        let f = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { sphere(x) };
        let out = solver().minimize(f, &[(-5.0, 5.0)]).unwrap();
        assert!(out.fun.is_finite());
        assert!(out.x[0] >= 0.0);
    }

    #[test]
    fn invalid_bounds_rejected() {
        let err = solver().minimize(sphere, &[(1.0, -1.0)]).unwrap_err();
        assert!(matches!(err, HbvError::RuntimeOptimization { .. }));
    }

    #[test]
    fn latin_hypercube_covers_every_stratum() {
        let mut rng = StdRng::seed_from_u64(4);
        let pop = init_latin_hypercube(&mut rng, 10, &[(0.0, 10.0)]);
        let mut cells: Vec<usize> = pop.iter().map(|m| m[0].floor() as usize).collect();
        cells.sort_unstable();
        assert_eq!(cells, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn donors_are_distinct() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let [a, b, c] = distinct_donors(&mut rng, 5, 2);
            assert!(a != b && b != c && a != c);
            assert!(![a, b, c].contains(&2));
        }
    }
}
