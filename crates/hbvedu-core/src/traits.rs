use crate::error::HbvError;

/// Core trait for lumped daily hydrological models.
///
/// A model is a pure step function over an explicit state. `run` drives it
/// over a forcing series; nothing is kept between calls.
pub trait HydrologicalModel {
    type Params: ModelParams;
    type State: ModelState;
    type Forcing: Copy;
    type Fluxes;
    type FluxesTimeseries: FluxesTimeseriesOps<Self::Fluxes>;
    /// Run-constant data derived from params and configuration.
    type Context;

    /// Execute one timestep, returning the new state and that step's fluxes.
    fn step(
        state: &Self::State,
        params: &Self::Params,
        forcing: &Self::Forcing,
        context: &Self::Context,
    ) -> (Self::State, Self::Fluxes);

    /// Run over a forcing series, returning all fluxes and the final state.
    fn run(
        params: &Self::Params,
        forcing: &[Self::Forcing],
        initial_state: &Self::State,
        context: &Self::Context,
    ) -> (Self::FluxesTimeseries, Self::State) {
        let mut state = initial_state.clone();
        let mut outputs = Self::FluxesTimeseries::with_capacity(forcing.len());

        for f in forcing {
            let (new_state, fluxes) = Self::step(&state, params, f, context);
            outputs.push(&fluxes);
            state = new_state;
        }

        (outputs, state)
    }
}

/// Parameter sets that can be flattened to and rebuilt from an ordered vector.
///
/// The order of `PARAM_NAMES` and `PARAM_BOUNDS` is the order optimisers see.
pub trait ModelParams: Sized + Clone {
    const N_PARAMS: usize;
    const PARAM_NAMES: &'static [&'static str];
    const PARAM_BOUNDS: &'static [(f64, f64)];

    fn from_array(arr: &[f64]) -> Result<Self, HbvError>;
    fn to_array(&self) -> Vec<f64>;
}

/// Model states that can be flattened to a vector.
pub trait ModelState: Sized + Clone {
    fn to_vec(&self) -> Vec<f64>;
    fn from_slice(arr: &[f64]) -> Result<Self, HbvError>;
}

/// Operations required on the timeseries collection type.
pub trait FluxesTimeseriesOps<F> {
    fn with_capacity(n: usize) -> Self;
    fn push(&mut self, f: &F);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}
