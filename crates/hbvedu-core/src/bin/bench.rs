/// Pure Rust core benchmarks for HBV-Educational.
///
/// `simulate` rows report the median of `REPEATS` runs; calibration rows
/// are timed once.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for data generation,
/// and std::hint::black_box to prevent dead-code elimination.
///
/// `RUST_LOG` or `-v`/`-vv` enables calibration logging.
use std::hint::black_box;
use std::time::{Duration, Instant};

use hbvedu_core::calibration::{fit, monte_carlo, CalibrationConfig, DifferentialEvolutionConfig};
use hbvedu_core::forcing::ModelInputs;
use hbvedu_core::hbv_edu::{HbvModel, Parameters, ReservoirState};
use hbvedu_core::{logging, HbvError};

const REPEATS: usize = 7;
const AREA_KM2: f64 = 410.0;

/// One row of the results table.
struct BenchRow {
    case: &'static str,
    /// Workload size with its unit, e.g. "3650 days".
    size: String,
    duration: Duration,
    /// `"median"` over `REPEATS` runs or `"single"` for one timed run.
    timing: &'static str,
}

/// Simple LCG PRNG for deterministic forcing.
fn make_inputs(n: usize, seed: u64) -> ModelInputs {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let month: Vec<u8> = (0..n).map(|i| ((i / 30) % 12) as u8 + 1).collect();
    let temp: Vec<f64> = month
        .iter()
        .map(|&m| {
            let seasonal = -10.0 * (2.0 * std::f64::consts::PI * (m as f64 - 1.0) / 12.0).cos();
            5.0 + seasonal + 6.0 * (next_f64() - 0.5)
        })
        .collect();
    let prec: Vec<f64> = (0..n)
        .map(|_| {
            let u = next_f64();
            if u < 0.6 {
                0.0
            } else {
                25.0 * (u - 0.6)
            }
        })
        .collect();

    ModelInputs {
        temp,
        prec,
        month,
        pe_m: vec![0.2, 0.4, 1.0, 2.0, 3.2, 4.2, 4.6, 3.8, 2.4, 1.2, 0.5, 0.2],
        t_m: vec![-8.0, -6.0, -1.0, 5.0, 11.0, 15.0, 17.0, 16.0, 11.0, 5.0, -1.0, -6.0],
        qobs: None,
        initial_state: ReservoirState::new(0.0, 150.0, 10.0, 40.0).unwrap_or_default(),
    }
}

fn reference_params() -> Result<Parameters, HbvError> {
    Parameters::new(0.0, 3.0, 250.0, 2.0, 0.05, 120.0, 0.2, 0.08, 0.02, 0.05, 20.0)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_simulate(
    model: &HbvModel,
    params: &Parameters,
    sizes: &[usize],
) -> Result<Vec<BenchRow>, HbvError> {
    let mut results = Vec::new();
    for &n in sizes {
        let inputs = make_inputs(n, 42);

        // Warmup
        black_box(model.simulate(params, &inputs)?);

        let dur = median_time(|| {
            let _ = black_box(model.simulate(params, &inputs));
        });
        results.push(BenchRow {
            case: "simulate",
            size: format!("{n} days"),
            duration: dur,
            timing: "median",
        });
    }
    Ok(results)
}

fn bench_monte_carlo(
    model: &HbvModel,
    params: &Parameters,
    n: usize,
    samples: usize,
) -> Result<BenchRow, HbvError> {
    let inputs = make_inputs(n, 7);
    let observed = model.simulate(params, &inputs)?;
    let config = CalibrationConfig::new().with_seed(1);

    let start = Instant::now();
    let result = monte_carlo(model, samples, Some(observed.as_slice()), &inputs, &config)?;
    let dur = start.elapsed();
    black_box(result.best_trial());
    Ok(BenchRow {
        case: "monte_carlo",
        size: format!("{samples} samples"),
        duration: dur,
        timing: "single",
    })
}

fn bench_fit(
    model: &HbvModel,
    params: &Parameters,
    n: usize,
) -> Result<BenchRow, HbvError> {
    let inputs = make_inputs(n, 7);
    let observed = model.simulate(params, &inputs)?;
    let config = CalibrationConfig::new()
        .with_seed(1)
        .with_differential_evolution(DifferentialEvolutionConfig::default().with_max_iter(50));

    let start = Instant::now();
    let result = fit(model, Some(observed.as_slice()), &inputs, &config)?;
    let dur = start.elapsed();
    black_box(result.params);
    Ok(BenchRow {
        case: "fit (50 gen)",
        size: format!("{} evals", result.n_evaluations),
        duration: dur,
        timing: "single",
    })
}

fn run() -> Result<(), HbvError> {
    let verbosity = std::env::args()
        .skip(1)
        .filter_map(|a| a.strip_prefix('-').map(|v| v.chars().filter(|c| *c == 'v').count()))
        .sum::<usize>();
    logging::init(verbosity.min(u8::MAX as usize) as u8);

    let model = HbvModel::new(AREA_KM2)?;
    let params = reference_params()?;

    println!("Pure Rust Core Benchmarks");
    println!("============================================================");
    println!(
        "{:<14} {:>14}   {:>10}   {}",
        "Case", "Size", "Time (ms)", "Timing"
    );
    println!("------------------------------------------------------");

    let mut all_results = bench_simulate(&model, &params, &[365, 3650, 36500])?;
    all_results.push(bench_monte_carlo(&model, &params, 3650, 1000)?);
    all_results.push(bench_fit(&model, &params, 1095)?);

    for row in &all_results {
        let ms = row.duration.as_secs_f64() * 1000.0;
        println!(
            "{:<14} {:>14}   {:>10.2}   {}",
            row.case, row.size, ms, row.timing
        );
    }

    println!("============================================================");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("bench failed: {e}");
        std::process::exit(1);
    }
}
