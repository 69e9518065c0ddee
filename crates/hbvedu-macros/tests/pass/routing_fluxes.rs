use hbvedu_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
pub struct RoutingFluxes {
    pub q0: f64,
    pub q1: f64,
    pub q2: f64,
}

fn main() {
    let mut ts = RoutingFluxesTimeseries::with_capacity(4);
    assert!(ts.is_empty());
    ts.push(&RoutingFluxes { q0: 0.5, q1: 1.0, q2: 2.0 });
    ts.push(&RoutingFluxes { q0: 0.0, q1: 0.8, q2: 1.9 });
    assert_eq!(ts.len(), 2);
    assert_eq!(ts.column("q1"), Some(&[1.0, 0.8][..]));
    assert_eq!(ts.column("discharge"), None);
    assert_eq!(RoutingFluxes::field_names(), &["q0", "q1", "q2"]);

    let f = RoutingFluxes { q0: 1.0, q1: 2.0, q2: 3.0 };
    assert_eq!(f.values(), [1.0, 2.0, 3.0]);

    let cols = ts.into_columns();
    assert_eq!(cols.len(), 3);
    assert_eq!(cols[2].0, "q2");
    assert_eq!(cols[2].1, vec![2.0, 1.9]);
}
