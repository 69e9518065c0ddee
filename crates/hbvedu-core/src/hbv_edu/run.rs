/// HBV-Educational model orchestration functions.
///
/// - `step()`: execute a single day
/// - `run()`: execute over a forcing series, keeping every flux
/// - `simulate()`: execute over a forcing series, keeping only discharge
use super::fluxes::{Fluxes, FluxesTimeseries};
use super::params::Parameters;
use super::processes;
use super::routing;
use super::state::ReservoirState;
use crate::error::HbvError;
use crate::forcing::{DailyForcing, ForcingSeries, MonthlyNormals, WatershedConfig};
use crate::traits::HydrologicalModel;

/// Run-constant data shared by every step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub normals: MonthlyNormals,
    pub watershed: WatershedConfig,
}

/// Execute one day of HBV-Educational.
///
/// Returns (new_state, fluxes).
///
/// # Panics
/// Panics if `day.month` is outside `1..=12`. Series built through
/// [`ForcingSeries::new`] never are.
pub fn step(
    state: &ReservoirState,
    params: &Parameters,
    day: &DailyForcing,
    context: &StepContext,
) -> (ReservoirState, Fluxes) {
    let temp = day.temp;
    let prec = day.prec;

    // 1. Evapotranspiration demand
    let pet = processes::potential_et(
        temp,
        context.normals.temp(day.month),
        context.normals.pet(day.month),
        params.c,
    );

    // 2. Snow routine
    let (rain, snowfall) = processes::partition_precipitation(prec, temp, params.t_t);
    let melt = processes::compute_melt(temp, params.t_t, params.dd, state.snow);
    let new_snow = processes::update_snow(state.snow, snowfall, melt);

    // 3. Soil routine
    let soil_input = rain + melt;
    let (new_sm, recharge, actual_et) = processes::update_soil(
        state.soil_moisture,
        soil_input,
        pet,
        params.fc,
        params.beta,
        params.pwp,
    );

    // 4. Response routine
    let s1_filled = state.s1 + recharge;
    let (q0, q1, percolation) =
        routing::upper_reservoir_outflows(s1_filled, params.k_0, params.k_1, params.k_p, params.l);
    let new_s1 = routing::update_upper_reservoir(s1_filled, q0, q1, percolation);
    let (new_s2, q2) = routing::lower_reservoir(state.s2, percolation, params.k_2);

    // 5. Discharge
    let runoff = q0 + q1 + q2;
    let discharge = context.watershed.to_discharge(runoff);

    let new_state = ReservoirState {
        snow: new_snow,
        soil_moisture: new_sm,
        s1: new_s1,
        s2: new_s2,
    };

    let fluxes = Fluxes {
        temp,
        prec,
        pet,
        rain,
        snowfall,
        melt,
        snow: new_snow,
        soil_input,
        recharge,
        actual_et,
        soil_moisture: new_sm,
        q0,
        q1,
        percolation,
        q2,
        s1: new_s1,
        s2: new_s2,
        runoff,
        discharge,
    };

    (new_state, fluxes)
}

fn validate(
    params: &Parameters,
    watershed: &WatershedConfig,
    initial_state: &ReservoirState,
) -> Result<(), HbvError> {
    params.validate()?;
    watershed.validate()?;
    initial_state.validate()
}

/// Run HBV-Educational over a forcing series.
///
/// Returns every per-day flux and the final state. Inputs are validated
/// before the first step; nothing is returned on failure.
pub fn run(
    params: &Parameters,
    forcing: &ForcingSeries,
    normals: &MonthlyNormals,
    watershed: &WatershedConfig,
    initial_state: &ReservoirState,
) -> Result<(FluxesTimeseries, ReservoirState), HbvError> {
    validate(params, watershed, initial_state)?;
    let context = StepContext {
        normals: *normals,
        watershed: *watershed,
    };

    let mut state = *initial_state;
    let mut outputs = FluxesTimeseries::with_capacity(forcing.len());
    for day in forcing.days() {
        let (new_state, fluxes) = step(&state, params, &day, &context);
        outputs.push(&fluxes);
        state = new_state;
    }

    Ok((outputs, state))
}

/// Simulated discharge [m3/s], one value per forcing day.
pub fn simulate(
    params: &Parameters,
    forcing: &ForcingSeries,
    normals: &MonthlyNormals,
    watershed: &WatershedConfig,
    initial_state: &ReservoirState,
) -> Result<Vec<f64>, HbvError> {
    validate(params, watershed, initial_state)?;
    Ok(simulate_unchecked(params, forcing, normals, watershed, initial_state))
}

/// Discharge loop without validation, for calibration hot paths that have
/// already validated their inputs once.
pub(crate) fn simulate_unchecked(
    params: &Parameters,
    forcing: &ForcingSeries,
    normals: &MonthlyNormals,
    watershed: &WatershedConfig,
    initial_state: &ReservoirState,
) -> Vec<f64> {
    let context = StepContext {
        normals: *normals,
        watershed: *watershed,
    };

    let mut state = *initial_state;
    let mut discharge = Vec::with_capacity(forcing.len());
    for day in forcing.days() {
        let (new_state, fluxes) = step(&state, params, &day, &context);
        discharge.push(fluxes.discharge);
        state = new_state;
    }
    discharge
}

/// Marker type plugging HBV-Educational into the generic model trait.
pub struct HbvEdu;

impl HydrologicalModel for HbvEdu {
    type Params = Parameters;
    type State = ReservoirState;
    type Forcing = DailyForcing;
    type Fluxes = Fluxes;
    type FluxesTimeseries = FluxesTimeseries;
    type Context = StepContext;

    fn step(
        state: &ReservoirState,
        params: &Parameters,
        forcing: &DailyForcing,
        context: &StepContext,
    ) -> (ReservoirState, Fluxes) {
        step(state, params, forcing, context)
    }
}
