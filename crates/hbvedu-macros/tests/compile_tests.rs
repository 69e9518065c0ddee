#[test]
fn derive_fluxes_expands() {
    let t = trybuild::TestCases::new();
    t.pass("tests/pass/routing_fluxes.rs");
    t.pass("tests/pass/renamed_timeseries.rs");
}
