/// HBV-Educational response routine.
///
/// Two linear reservoirs: S1 (near-surface, with a threshold outlet) drains
/// through `K_0`, `K_1` and percolates to S2 through `K_p`; S2 drains
/// through `K_2`.
use super::processes::{capped, non_negative};

/// Outflows from the near-surface reservoir after recharge.
///
/// Returns `(q0, q1, percolation)`. When the combined demand exceeds the
/// storage all three are scaled down proportionally.
pub fn upper_reservoir_outflows(s1: f64, k_0: f64, k_1: f64, k_p: f64, l: f64) -> (f64, f64, f64) {
    let s1 = non_negative(s1);
    let q0 = k_0 * non_negative(s1 - l);
    let q1 = k_1 * s1;
    let perc = k_p * s1;

    let total = q0 + q1 + perc;
    if total > s1 && total > 0.0 {
        let scale = s1 / total;
        (q0 * scale, q1 * scale, perc * scale)
    } else {
        (q0, q1, perc)
    }
}

/// Update the near-surface reservoir.
pub fn update_upper_reservoir(s1: f64, q0: f64, q1: f64, perc: f64) -> f64 {
    non_negative(s1 - q0 - q1 - perc)
}

/// Base-flow reservoir after percolation: returns `(new_s2, q2)`.
pub fn lower_reservoir(s2: f64, perc: f64, k_2: f64) -> (f64, f64) {
    let filled = s2 + perc;
    let q2 = non_negative(capped(k_2 * filled, filled));
    (non_negative(filled - q2), q2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_threshold_flow_below_l() {
        let (q0, q1, perc) = upper_reservoir_outflows(10.0, 0.3, 0.1, 0.05, 20.0);
        assert_eq!(q0, 0.0);
        assert_relative_eq!(q1, 1.0);
        assert_relative_eq!(perc, 0.5);
    }

    #[test]
    fn threshold_flow_above_l() {
        let (q0, _, _) = upper_reservoir_outflows(30.0, 0.3, 0.1, 0.05, 20.0);
        assert_relative_eq!(q0, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn outflows_never_exceed_storage() {
        let (q0, q1, perc) = upper_reservoir_outflows(100.0, 0.9, 0.9, 0.9, 0.0);
        assert_relative_eq!(q0 + q1 + perc, 100.0, epsilon = 1e-9);
        assert!(update_upper_reservoir(100.0, q0, q1, perc) < 1e-9);
    }

    #[test]
    fn empty_reservoir_has_no_outflow() {
        assert_eq!(upper_reservoir_outflows(0.0, 0.3, 0.1, 0.05, 5.0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn lower_reservoir_mass_balance() {
        let (s2, q2) = lower_reservoir(40.0, 10.0, 0.02);
        assert_relative_eq!(q2, 1.0, epsilon = 1e-12);
        assert_relative_eq!(s2 + q2, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn lower_reservoir_recession() {
        let mut s2 = 100.0;
        let mut last_q = f64::INFINITY;
        for _ in 0..10 {
            let (new_s2, q2) = lower_reservoir(s2, 0.0, 0.05);
            assert!(q2 < last_q);
            last_q = q2;
            s2 = new_s2;
        }
    }
}
