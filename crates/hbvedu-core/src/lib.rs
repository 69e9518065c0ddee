/// hbvedu-core: the HBV-Educational rainfall-runoff model in Rust.
///
/// Daily simulation of snow, soil moisture and two linear reservoirs,
/// plus calibration against observed discharge by differential evolution
/// and Monte-Carlo sampling.
pub mod calibration;
pub mod error;
pub mod forcing;
pub mod hbv_edu;
pub mod logging;
pub mod metrics;
pub mod traits;

pub use error::HbvError;
