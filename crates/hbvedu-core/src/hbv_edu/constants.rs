/// HBV-Educational parameter names and default calibration bounds.

/// Parameter names in canonical (optimiser) order.
pub const PARAM_NAMES: &[&str] = &[
    "T_t", "DD", "FC", "Beta", "C", "PWP", "K_0", "K_1", "K_2", "K_p", "L",
];

/// Number of parameters.
pub const N_PARAMS: usize = 11;

/// Number of state variables: snow, soil moisture, S1, S2.
pub const STATE_SIZE: usize = 4;

/// Parameter bounds for calibration.
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Temperature threshold for snowfall and melt [C].
pub const T_T_BOUNDS: Bounds = Bounds {
    min: -2.0,
    max: 2.0,
};

/// Degree-day factor [mm/C/d].
pub const DD_BOUNDS: Bounds = Bounds { min: 0.5, max: 6.0 };

/// Field capacity [mm].
pub const FC_BOUNDS: Bounds = Bounds {
    min: 50.0,
    max: 500.0,
};

/// Soil routing shape exponent [-].
pub const BETA_BOUNDS: Bounds = Bounds { min: 1.0, max: 6.0 };

/// PET temperature correction factor [1/C].
pub const C_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 0.1,
};

/// Permanent wilting point [mm].
pub const PWP_BOUNDS: Bounds = Bounds {
    min: 20.0,
    max: 250.0,
};

/// Near-surface flow coefficient above `L` [1/d].
pub const K_0_BOUNDS: Bounds = Bounds {
    min: 0.05,
    max: 0.5,
};

/// Interflow coefficient [1/d].
pub const K_1_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 0.3,
};

/// Baseflow coefficient [1/d].
pub const K_2_BOUNDS: Bounds = Bounds {
    min: 0.001,
    max: 0.1,
};

/// Percolation coefficient [1/d].
pub const K_P_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 0.3,
};

/// Threshold storage for near-surface flow [mm].
pub const L_BOUNDS: Bounds = Bounds {
    min: 1.0,
    max: 70.0,
};

/// All bounds as `(min, max)` tuples, for the `ModelParams` trait.
pub const PARAM_BOUNDS: &[(f64, f64)] = &[
    (T_T_BOUNDS.min, T_T_BOUNDS.max),
    (DD_BOUNDS.min, DD_BOUNDS.max),
    (FC_BOUNDS.min, FC_BOUNDS.max),
    (BETA_BOUNDS.min, BETA_BOUNDS.max),
    (C_BOUNDS.min, C_BOUNDS.max),
    (PWP_BOUNDS.min, PWP_BOUNDS.max),
    (K_0_BOUNDS.min, K_0_BOUNDS.max),
    (K_1_BOUNDS.min, K_1_BOUNDS.max),
    (K_2_BOUNDS.min, K_2_BOUNDS.max),
    (K_P_BOUNDS.min, K_P_BOUNDS.max),
    (L_BOUNDS.min, L_BOUNDS.max),
];

/// Position of a parameter name in canonical order.
pub fn param_index(name: &str) -> Option<usize> {
    PARAM_NAMES.iter().position(|&n| n == name)
}
