/// HBV-Educational: a lumped conceptual rainfall-runoff model.
///
/// 11 parameters, daily time step. Snow routine (threshold temperature and
/// degree-day melt), soil moisture routine (nonlinear recharge, PET with a
/// temperature-anomaly correction) and a response routine of two linear
/// reservoirs.
pub mod constants;
pub mod fluxes;
pub mod model;
pub mod params;
pub mod processes;
pub mod routing;
pub mod run;
pub mod space;
pub mod state;

pub use fluxes::{Fluxes, FluxesTimeseries};
pub use model::HbvModel;
pub use params::Parameters;
pub use space::ParameterSpace;
pub use state::ReservoirState;
