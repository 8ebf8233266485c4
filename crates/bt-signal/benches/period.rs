use bt_signal::{
    BandConfig, BandLocator, PeriodConfig, ProfileBuilder, ProfileConfig,
    WavelengthPhaseEstimator,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn build_striped_column(len: usize, spacing: usize) -> Vec<f32> {
    (0..len)
        .map(|i| if i % spacing == 0 { 20.0 } else { 230.0 })
        .collect()
}

fn bench_period_estimate(c: &mut Criterion) {
    let column = build_striped_column(100, 8);
    let profile = ProfileBuilder::new(&ProfileConfig::default()).build(&column);
    let mut est = WavelengthPhaseEstimator::new(&PeriodConfig::default());

    c.bench_function("period_estimate_100", |b| {
        b.iter(|| {
            let out = est.estimate(black_box(&profile.gradient));
            black_box(out.ok());
        });
    });
}

fn bench_column_full(c: &mut Criterion) {
    let column = build_striped_column(100, 8);
    let builder = ProfileBuilder::new(&ProfileConfig::default());
    let mut est = WavelengthPhaseEstimator::new(&PeriodConfig::default());
    let locator = BandLocator::new(&BandConfig::default());

    c.bench_function("column_profile_period_band_100", |b| {
        b.iter(|| {
            let profile = builder.build(black_box(&column));
            if let Ok(e) = est.estimate(&profile.gradient) {
                black_box(locator.locate(&e, &profile.darkness).len());
            }
        });
    });
}

criterion_group!(benches, bench_period_estimate, bench_column_full);
criterion_main!(benches);
