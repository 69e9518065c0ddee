use hbvedu_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
#[fluxes(timeseries_name = "SnowSeries")]
pub struct SnowFluxes {
    pub melt: f64,
    pub snow_pack: f64,
}

fn main() {
    let mut ts = SnowSeries::with_capacity(1);
    ts.push(&SnowFluxes { melt: 1.5, snow_pack: 40.0 });
    assert_eq!(ts.len(), 1);
    assert_eq!(ts.snow_pack, vec![40.0]);
    assert_eq!(SnowFluxes::field_names(), &["melt", "snow_pack"]);
}
