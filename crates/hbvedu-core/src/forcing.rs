//! Forcing data, long-term monthly normals and catchment configuration.
//!
//! Everything here is validated on construction so the simulation loop can
//! index without checks.

use serde::{Deserialize, Serialize};

use crate::error::HbvError;
use crate::hbv_edu::state::ReservoirState;

/// Number of entries in a monthly normals table.
pub const MONTHS_PER_YEAR: usize = 12;

/// Validated daily forcing series.
///
/// `temp`, `prec` and `month` have equal, non-zero length and every month
/// lies in `1..=12`. NaN values are accepted and propagate into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingSeries {
    temp: Vec<f64>,
    prec: Vec<f64>,
    month: Vec<u8>,
}

impl ForcingSeries {
    /// Create a forcing series, checking lengths and month range.
    pub fn new(temp: Vec<f64>, prec: Vec<f64>, month: Vec<u8>) -> Result<Self, HbvError> {
        if temp.len() != prec.len() {
            return Err(HbvError::ShapeMismatch {
                left: "temp",
                left_len: temp.len(),
                right: "prec",
                right_len: prec.len(),
            });
        }
        if temp.len() != month.len() {
            return Err(HbvError::ShapeMismatch {
                left: "temp",
                left_len: temp.len(),
                right: "month",
                right_len: month.len(),
            });
        }
        if temp.is_empty() {
            return Err(HbvError::InvalidForcing("forcing series is empty".into()));
        }
        if let Some((t, m)) = month
            .iter()
            .enumerate()
            .find(|(_, m)| !(1..=12).contains(*m))
        {
            return Err(HbvError::InvalidForcing(format!(
                "month at index {t} is {m}, expected 1..=12"
            )));
        }
        Ok(Self { temp, prec, month })
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.temp.len()
    }

    /// Whether the series has no timesteps. Validated series never do.
    pub fn is_empty(&self) -> bool {
        self.temp.is_empty()
    }

    pub fn temp(&self) -> &[f64] {
        &self.temp
    }

    pub fn prec(&self) -> &[f64] {
        &self.prec
    }

    pub fn month(&self) -> &[u8] {
        &self.month
    }

    /// Forcing for day `t`.
    ///
    /// # Panics
    /// Panics if `t >= self.len()`.
    pub fn day(&self, t: usize) -> DailyForcing {
        DailyForcing {
            temp: self.temp[t],
            prec: self.prec[t],
            month: self.month[t],
        }
    }

    /// Iterate over daily records in order.
    pub fn days(&self) -> impl Iterator<Item = DailyForcing> + '_ {
        (0..self.len()).map(|t| self.day(t))
    }
}

/// One day of forcing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyForcing {
    /// Air temperature [C].
    pub temp: f64,
    /// Precipitation [mm/d].
    pub prec: f64,
    /// Calendar month, 1..=12.
    pub month: u8,
}

/// Long-term monthly mean temperature and potential evapotranspiration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyNormals {
    temp: [f64; MONTHS_PER_YEAR],
    pet: [f64; MONTHS_PER_YEAR],
}

impl MonthlyNormals {
    /// Build from the monthly mean temperature (`t_m`, C) and monthly mean
    /// potential evapotranspiration (`pe_m`, mm/d), January first.
    pub fn new(t_m: &[f64], pe_m: &[f64]) -> Result<Self, HbvError> {
        let temp: [f64; MONTHS_PER_YEAR] = t_m.try_into().map_err(|_| {
            HbvError::InvalidConfiguration(format!(
                "t_m must have {MONTHS_PER_YEAR} values, got {}",
                t_m.len()
            ))
        })?;
        let pet: [f64; MONTHS_PER_YEAR] = pe_m.try_into().map_err(|_| {
            HbvError::InvalidConfiguration(format!(
                "pe_m must have {MONTHS_PER_YEAR} values, got {}",
                pe_m.len()
            ))
        })?;
        Ok(Self { temp, pet })
    }

    /// Mean temperature for a 1-based month.
    ///
    /// # Panics
    /// Panics if `month` is outside `1..=12`.
    pub fn temp(&self, month: u8) -> f64 {
        self.temp[usize::from(month) - 1]
    }

    /// Mean potential evapotranspiration for a 1-based month.
    ///
    /// # Panics
    /// Panics if `month` is outside `1..=12`.
    pub fn pet(&self, month: u8) -> f64 {
        self.pet[usize::from(month) - 1]
    }
}

/// Catchment configuration used to turn specific runoff into discharge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatershedConfig {
    /// Catchment area [km2].
    pub area_km2: f64,
}

/// mm/d over 1 km2 expressed in m3/s is `1 / 86.4`.
pub const MM_KM2_PER_DAY_TO_M3_S: f64 = 86.4;

impl WatershedConfig {
    pub fn new(area_km2: f64) -> Result<Self, HbvError> {
        let config = Self { area_km2 };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HbvError> {
        if !self.area_km2.is_finite() || self.area_km2 <= 0.0 {
            return Err(HbvError::InvalidConfiguration(format!(
                "catchment area must be finite and positive, got {}",
                self.area_km2
            )));
        }
        Ok(())
    }

    /// Convert specific runoff [mm/d] to volumetric discharge [m3/s].
    pub fn to_discharge(&self, runoff_mm: f64) -> f64 {
        runoff_mm * self.area_km2 / MM_KM2_PER_DAY_TO_M3_S
    }

    /// Convert volumetric discharge [m3/s] back to specific runoff [mm/d].
    pub fn to_runoff(&self, discharge: f64) -> f64 {
        discharge * MM_KM2_PER_DAY_TO_M3_S / self.area_km2
    }
}

/// Every input a simulation or calibration run needs, as plain arrays.
///
/// Field names follow the usual HBV-Educational conventions: `temp` [C],
/// `prec` [mm/d], `month` [1..=12], `pe_m` monthly mean PET [mm/d],
/// `t_m` monthly mean temperature [C], optional observed discharge `qobs`
/// [m3/s], and the initial reservoir state (all zero by default).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelInputs {
    pub temp: Vec<f64>,
    pub prec: Vec<f64>,
    pub month: Vec<u8>,
    #[serde(rename = "PE_m", alias = "pe_m")]
    pub pe_m: Vec<f64>,
    #[serde(rename = "T_m", alias = "t_m")]
    pub t_m: Vec<f64>,
    #[serde(default)]
    pub qobs: Option<Vec<f64>>,
    #[serde(default)]
    pub initial_state: ReservoirState,
}

impl ModelInputs {
    /// Validate and split into the typed pieces the engine consumes.
    pub fn prepare(&self) -> Result<(ForcingSeries, MonthlyNormals), HbvError> {
        let forcing = ForcingSeries::new(self.temp.clone(), self.prec.clone(), self.month.clone())?;
        let normals = MonthlyNormals::new(&self.t_m, &self.pe_m)?;
        self.initial_state.validate()?;
        Ok((forcing, normals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normals() -> MonthlyNormals {
        let t_m: Vec<f64> = (1..=12).map(|m| m as f64).collect();
        let pe_m: Vec<f64> = (1..=12).map(|m| 0.1 * m as f64).collect();
        MonthlyNormals::new(&t_m, &pe_m).unwrap()
    }

    #[test]
    fn valid_forcing_series() {
        let f = ForcingSeries::new(vec![1.0, 2.0], vec![0.0, 3.0], vec![1, 12]).unwrap();
        assert_eq!(f.len(), 2);
        assert_eq!(f.day(1).month, 12);
        assert_eq!(f.days().count(), 2);
    }

    #[test]
    fn rejects_prec_length_mismatch() {
        let err = ForcingSeries::new(vec![1.0, 2.0], vec![0.0], vec![1, 1]).unwrap_err();
        assert!(matches!(err, HbvError::ShapeMismatch { right: "prec", .. }));
    }

    #[test]
    fn rejects_month_length_mismatch() {
        let err = ForcingSeries::new(vec![1.0], vec![0.0], vec![1, 2]).unwrap_err();
        assert!(matches!(err, HbvError::ShapeMismatch { right: "month", .. }));
    }

    #[test]
    fn rejects_empty_series() {
        let err = ForcingSeries::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, HbvError::InvalidForcing(_)));
    }

    #[test]
    fn rejects_month_out_of_range() {
        let err = ForcingSeries::new(vec![1.0, 1.0], vec![0.0, 0.0], vec![1, 13]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
        assert!(ForcingSeries::new(vec![1.0], vec![0.0], vec![0]).is_err());
    }

    #[test]
    fn nan_forcing_is_accepted() {
        assert!(ForcingSeries::new(vec![f64::NAN], vec![1.0], vec![3]).is_ok());
    }

    #[test]
    fn normals_lookup_is_one_based() {
        let n = normals();
        assert_eq!(n.temp(1), 1.0);
        assert_eq!(n.temp(12), 12.0);
        assert_relative_eq!(n.pet(6), 0.6);
    }

    #[test]
    #[should_panic]
    fn normals_panic_on_month_zero() {
        normals().temp(0);
    }

    #[test]
    #[should_panic]
    fn normals_panic_on_month_thirteen() {
        normals().pet(13);
    }

    #[test]
    fn normals_require_twelve_entries() {
        let err = MonthlyNormals::new(&[0.0; 11], &[0.0; 12]).unwrap_err();
        assert!(matches!(err, HbvError::InvalidConfiguration(_)));
        assert!(MonthlyNormals::new(&[0.0; 12], &[0.0; 13]).is_err());
    }

    #[test]
    fn watershed_conversion_roundtrip() {
        let w = WatershedConfig::new(86.4).unwrap();
        assert_relative_eq!(w.to_discharge(2.0), 2.0);
        assert_relative_eq!(w.to_runoff(w.to_discharge(3.7)), 3.7, epsilon = 1e-12);
    }

    #[test]
    fn watershed_rejects_bad_area() {
        assert!(WatershedConfig::new(0.0).is_err());
        assert!(WatershedConfig::new(-5.0).is_err());
        assert!(WatershedConfig::new(f64::NAN).is_err());
    }

    #[test]
    fn inputs_prepare_validates_everything() {
        let mut inputs = ModelInputs {
            temp: vec![1.0; 3],
            prec: vec![2.0; 3],
            month: vec![4; 3],
            pe_m: vec![1.0; 12],
            t_m: vec![5.0; 12],
            ..Default::default()
        };
        assert!(inputs.prepare().is_ok());

        inputs.pe_m.pop();
        assert!(matches!(
            inputs.prepare(),
            Err(HbvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn inputs_deserialize_with_canonical_names() {
        let toml_src = r#"
            temp = [1.0, 2.0]
            prec = [0.0, 4.0]
            month = [1, 1]
            PE_m = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            T_m = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]

            [initial_state]
            snow = 10.0
        "#;
        let inputs: ModelInputs = toml::from_str(toml_src).unwrap();
        assert_eq!(inputs.initial_state.snow, 10.0);
        assert_eq!(inputs.initial_state.soil_moisture, 0.0);
        assert!(inputs.qobs.is_none());
        assert!(inputs.prepare().is_ok());
    }
}
