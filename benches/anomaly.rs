use chrono::{Duration, NaiveDate};
use climate_anomaly::{analyze, monthly_medians, TemperatureObservation, TemperatureSeries};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_series() -> TemperatureSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (0..25 * 365)
        .map(|day| {
            let seasonal = (day as f64 / 365.25 * std::f64::consts::TAU).sin() * 12.0;
            TemperatureObservation::new(start + Duration::days(day), 10.0 + seasonal)
        })
        .collect()
}

fn bench_analysis(c: &mut Criterion) {
    let series = synthetic_series();
    c.bench_function("analyze", |b| b.iter(|| analyze(black_box(&series))));
    c.bench_function("monthly_medians", |b| {
        b.iter(|| monthly_medians(black_box(&series)))
    });
}

criterion_group!(benches, bench_analysis);
criterion_main!(benches);
