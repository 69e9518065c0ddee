//! HBV-Educational evapotranspiration, snow and soil moisture processes.
//!
//! Pure functions; the run loop in `run.rs` composes them in order.
//! Clamping goes through `non_negative` and `capped` so NaN survives
//! instead of being swallowed by `f64::max`/`f64::min`.

/// `max(x, 0)` that keeps NaN.
pub(crate) fn non_negative(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// `min(x, cap)` that keeps NaN.
pub(crate) fn capped(x: f64, cap: f64) -> f64 {
    if x > cap {
        cap
    } else {
        x
    }
}

/// Potential evapotranspiration corrected for the temperature anomaly.
///
/// `PE = (1 + C * (T - T_m)) * PE_m`, clipped to non-negative.
pub fn potential_et(temp: f64, monthly_temp: f64, monthly_pet: f64, c: f64) -> f64 {
    non_negative((1.0 + c * (temp - monthly_temp)) * monthly_pet)
}

/// Partition precipitation into rain and snowfall.
///
/// Everything falls as snow strictly below the threshold. Returns
/// `(rain, snowfall)`.
pub fn partition_precipitation(prec: f64, temp: f64, t_t: f64) -> (f64, f64) {
    if temp < t_t {
        (0.0, prec)
    } else {
        (prec, 0.0)
    }
}

/// Degree-day snowmelt, limited by the snow pack.
pub fn compute_melt(temp: f64, t_t: f64, dd: f64, snow: f64) -> f64 {
    if temp > t_t {
        non_negative(capped(dd * (temp - t_t), snow))
    } else {
        0.0
    }
}

/// New snow storage after accumulation and melt.
pub fn update_snow(snow: f64, snowfall: f64, melt: f64) -> f64 {
    non_negative(snow + snowfall - melt)
}

/// Recharge to the upper reservoir: `input * (SM / FC)^Beta`.
pub fn compute_recharge(soil_input: f64, sm: f64, fc: f64, beta: f64) -> f64 {
    if soil_input <= 0.0 {
        return 0.0;
    }
    if fc <= 0.0 {
        return soil_input;
    }
    let ratio = (sm / fc).clamp(0.0, 1.0);
    soil_input * ratio.powf(beta)
}

/// Actual evapotranspiration.
///
/// Full demand above the permanent wilting point, reduced linearly below it,
/// never more than the available soil moisture.
pub fn compute_actual_et(pet: f64, sm: f64, pwp: f64) -> f64 {
    let available = non_negative(sm);
    let et = if pwp <= 0.0 || sm >= pwp {
        pet
    } else {
        pet * available / pwp
    };
    capped(et, available)
}

/// Soil moisture bucket update for one day.
///
/// Returns `(new_sm, recharge, actual_et)`. Recharge includes any storage
/// spilled above field capacity.
pub fn update_soil(
    sm: f64,
    soil_input: f64,
    pet: f64,
    fc: f64,
    beta: f64,
    pwp: f64,
) -> (f64, f64, f64) {
    let mut recharge = compute_recharge(soil_input, sm, fc, beta);
    let mut wet = sm + soil_input - recharge;

    let spill = non_negative(wet - non_negative(fc));
    wet -= spill;
    recharge += spill;

    let et = compute_actual_et(pet, wet, pwp);
    (non_negative(wet - et), recharge, et)
}
